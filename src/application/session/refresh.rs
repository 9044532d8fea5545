use crate::application::session::store::RefreshTokenStore;
use crate::application::session::token_utils::TokenPair;
use crate::domain::tokens::TokenSigner;
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct RefreshUseCase {
    signer: Arc<dyn TokenSigner>,
    refresh_store: RefreshTokenStore,
    access_token_expiry: i64,
}

impl RefreshUseCase {
    pub fn new(
        signer: Arc<dyn TokenSigner>,
        refresh_store: RefreshTokenStore,
        access_token_expiry: i64,
    ) -> Self {
        Self {
            signer,
            refresh_store,
            access_token_expiry,
        }
    }

    /// Rotate the presented refresh secret and issue a fresh access token
    /// for its owning user. Unknown, revoked, and expired tokens all fail
    /// the same way.
    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, refresh_secret: &str) -> Result<TokenPair, AppError> {
        let (user_id, replacement) = self.refresh_store.rotate(refresh_secret).await?;

        let access_token = self
            .signer
            .issue_access_token(user_id)
            .map_err(AppError::InternalServerError)?;

        Ok(TokenPair {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            refresh_secret: replacement.secret,
            refresh_expires_at: replacement.expires_at,
        })
    }
}
