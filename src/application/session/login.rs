use crate::application::session::store::RefreshTokenStore;
use crate::application::session::token_utils::{TokenPair, issue_token_pair};
use crate::domain::password::PasswordHasher;
use crate::domain::tokens::TokenSigner;
use crate::domain::users::{PublicUser, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Email or username; treated as an email when it contains '@'.
    #[validate(length(min = 1, message = "Identifier is required"))]
    #[schema(example = "cat@example.com")]
    pub identifier: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
    refresh_store: RefreshTokenStore,
    access_token_expiry: i64,
}

impl LoginUseCase {
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

    #[tracing::instrument(skip(self, req))]
    pub async fn execute(&self, req: LoginRequest) -> Result<LoginOutput, AppError> {
        let identifier = req.identifier.trim();

        let user = if identifier.contains('@') {
            self.user_repo
                .find_by_email(&identifier.to_lowercase())
                .await
        } else {
            self.user_repo.find_by_username(identifier).await
        }
        .map_err(AppError::InternalServerError)?
        // Unknown identifier and wrong password must be indistinguishable.
        .ok_or(AppError::InvalidCredentials)?;

        let valid_password = self
            .password_hasher
            .verify_password(&req.password, &user.password_hash)
            .map_err(AppError::InternalServerError)?;

        if !valid_password {
            return Err(AppError::InvalidCredentials);
        }

        self.user_repo
            .record_login(user.id)
            .await
            .map_err(AppError::InternalServerError)?;

        let tokens = issue_token_pair(
            user.id,
            &self.signer,
            &self.refresh_store,
            self.access_token_expiry,
        )
        .await?;

        Ok(LoginOutput {
            user: user.into(),
            tokens,
        })
    }
}
