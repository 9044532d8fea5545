use crate::application::session::store::{RefreshTokenError, RefreshTokenStore};
use crate::domain::tokens::TokenSigner;
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Access/refresh pair produced by register, login, and refresh. The refresh
/// secret travels to the transport layer, which decides between cookie-only
/// and body echo.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    #[serde(skip)]
    pub refresh_secret: String,
    #[serde(skip)]
    pub refresh_expires_at: OffsetDateTime,
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::Invalid => {
                AppError::Unauthenticated("Invalid refresh token".to_string())
            }
            RefreshTokenError::Storage(e) => AppError::InternalServerError(e),
        }
    }
}

/// Issue a complete token pair for a user: a signed access token plus a
/// persisted refresh token.
pub async fn issue_token_pair(
    user_id: Uuid,
    signer: &Arc<dyn TokenSigner>,
    store: &RefreshTokenStore,
    access_token_expiry: i64,
) -> Result<TokenPair, AppError> {
    let access_token = signer
        .issue_access_token(user_id)
        .map_err(AppError::InternalServerError)?;

    let refresh = store.issue(user_id).await?;

    Ok(TokenPair {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: access_token_expiry,
        refresh_secret: refresh.secret,
        refresh_expires_at: refresh.expires_at,
    })
}
