use crate::application::session::store::RefreshTokenStore;
use crate::application::session::token_utils::{TokenPair, issue_token_pair};
use crate::domain::password::PasswordHasher;
use crate::domain::tokens::TokenSigner;
use crate::domain::users::{CreateUserError, NewUser, PublicUser, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Length check on the trimmed username; surrounding whitespace is stripped
/// before the record is created, so it must not count toward the minimum.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().len() < 3 {
        let mut err = ValidationError::new("length");
        err.message = Some("Username must be at least 3 characters".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "cat@example.com")]
    pub email: String,

    #[validate(custom(function = validate_username))]
    #[schema(example = "cat", min_length = 3)]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

pub struct RegisterUseCase {
    user_repo: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
    refresh_store: RefreshTokenStore,
    access_token_expiry: i64,
}

impl RegisterUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
        refresh_store: RefreshTokenStore,
        access_token_expiry: i64,
    ) -> Self {
        Self {
            user_repo,
            password_hasher,
            signer,
            refresh_store,
            access_token_expiry,
        }
    }

    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn execute(&self, req: RegisterRequest) -> Result<RegisterOutput, AppError> {
        let email = req.email.trim().to_lowercase();
        let username = req.username.trim().to_string();
        let display_name = req
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| username.clone());

        let password_hash = self
            .password_hasher
            .hash_password(&req.password)
            .map_err(AppError::InternalServerError)?;

        // No uniqueness pre-checks: the insert settles duplicate races via
        // the unique constraints and reports which field collided.
        let user = self
            .user_repo
            .create(NewUser {
                email,
                username,
                display_name,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                CreateUserError::EmailTaken | CreateUserError::UsernameTaken => {
                    AppError::Conflict(e.to_string())
                }
                CreateUserError::Other(e) => AppError::InternalServerError(e),
            })?;

        let tokens = issue_token_pair(
            user.id,
            &self.signer,
            &self.refresh_store,
            self.access_token_expiry,
        )
        .await?;

        Ok(RegisterOutput {
            user: user.into(),
            tokens,
        })
    }
}
