use crate::application::session::store::RefreshTokenStore;
use crate::shared::error::AppError;

pub struct LogoutUseCase {
    refresh_store: RefreshTokenStore,
}

impl LogoutUseCase {
    pub fn new(refresh_store: RefreshTokenStore) -> Self {
        Self { refresh_store }
    }

    /// Revoke the presented refresh secret. Always succeeds for unknown or
    /// already-revoked tokens; the caller learns nothing about whether the
    /// token ever existed.
    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, refresh_secret: &str) -> Result<(), AppError> {
        self.refresh_store.revoke(refresh_secret).await?;
        Ok(())
    }
}
