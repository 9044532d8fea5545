use crate::domain::tokens::TokenSigner;
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Authenticated user extractor.
/// Validates the bearer access token from the Authorization header.
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthenticated("Invalid Authorization header format".to_string())
        })?;

        let user_id = state
            .signer
            .verify_access_token(token)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
