use crate::domain::tokens::{NewRefreshToken, RefreshTokenRepository};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Raw length of a refresh secret in bytes; hex-encoded to 128 characters.
const SECRET_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    /// Unknown, revoked, or expired token. Internal reasons are deliberately
    /// collapsed so callers cannot probe token state.
    #[error("Invalid refresh token")]
    Invalid,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// A freshly issued refresh token. The secret is exposed exactly once here;
/// storage only ever sees its hash.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub secret: String,
    pub expires_at: OffsetDateTime,
}

/// Generate a cryptographically random refresh secret.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest of a refresh secret. The secret already carries full
/// entropy, so a plain hash (not a password KDF) is sufficient for storage.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue/redeem/rotate/revoke semantics over the refresh token repository.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
    /// Refresh token lifetime in seconds.
    ttl_seconds: i64,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>, ttl_seconds: i64) -> Self {
        Self { repo, ttl_seconds }
    }

    /// Create and persist a new refresh token for a user, returning the raw
    /// secret.
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedRefreshToken, RefreshTokenError> {
        let secret = generate_secret();
        let expires_at = OffsetDateTime::now_utc() + Duration::seconds(self.ttl_seconds);

        self.repo
            .create(NewRefreshToken {
                user_id,
                token_hash: hash_secret(&secret),
                expires_at,
            })
            .await?;

        Ok(IssuedRefreshToken { secret, expires_at })
    }

    /// Resolve a secret to its owning user, failing for unknown, revoked, or
    /// expired tokens.
    pub async fn redeem(&self, secret: &str) -> Result<Uuid, RefreshTokenError> {
        let token = self
            .repo
            .find_by_hash(&hash_secret(secret))
            .await?
            .ok_or(RefreshTokenError::Invalid)?;

        if !token.is_active(OffsetDateTime::now_utc()) {
            return Err(RefreshTokenError::Invalid);
        }

        Ok(token.user_id)
    }

    /// Replace a token with a successor. The old token is revoked and linked
    /// to the new hash in a single compare-and-swap write, then the new
    /// record is inserted. A concurrent rotation of the same secret loses
    /// the swap and fails as invalid.
    pub async fn rotate(
        &self,
        secret: &str,
    ) -> Result<(Uuid, IssuedRefreshToken), RefreshTokenError> {
        let user_id = self.redeem(secret).await?;

        let new_secret = generate_secret();
        let new_hash = hash_secret(&new_secret);
        let expires_at = OffsetDateTime::now_utc() + Duration::seconds(self.ttl_seconds);

        let swapped = self
            .repo
            .mark_rotated(&hash_secret(secret), &new_hash)
            .await?;
        if !swapped {
            return Err(RefreshTokenError::Invalid);
        }

        self.repo
            .create(NewRefreshToken {
                user_id,
                token_hash: new_hash,
                expires_at,
            })
            .await?;

        Ok((
            user_id,
            IssuedRefreshToken {
                secret: new_secret,
                expires_at,
            },
        ))
    }

    /// Revoke a token if it is still active. Silently succeeds for unknown
    /// or already-revoked tokens so logout stays idempotent and leaks
    /// nothing about token existence.
    pub async fn revoke(&self, secret: &str) -> Result<(), RefreshTokenError> {
        self.repo.revoke(&hash_secret(secret)).await?;
        Ok(())
    }
}
