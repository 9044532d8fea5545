use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Access token claims. Refresh tokens are opaque random secrets, not JWTs,
/// so only the short-lived access token carries claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_seconds: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow::anyhow!("Invalid user ID in claims: {}", e))
    }
}

/// Stateless signer for access tokens. No server-side revocation exists for
/// these; their short lifetime bounds the blast radius of leakage.
pub trait TokenSigner: Send + Sync {
    fn issue_access_token(&self, user_id: Uuid) -> Result<String>;

    /// Verify signature, expiry, and subject; returns the embedded user id.
    fn verify_access_token(&self, token: &str) -> Result<Uuid>;
}

/// Refresh token entity. Rows are kept after revocation as an audit trail;
/// `replaced_by_hash` links a rotated token to its successor.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
    pub replaced_by_hash: Option<String>,
    pub created_at: OffsetDateTime,
}

impl RefreshToken {
    /// Usable iff not revoked and not past expiry.
    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
}

/// Repository trait for refresh tokens. Tokens are keyed by the SHA-256 hash
/// of their secret; the raw secret never reaches storage.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken>;

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>>;

    /// Mark a token revoked. Returns false when no active row matched, which
    /// callers treat as already-revoked or unknown.
    async fn revoke(&self, token_hash: &str) -> Result<bool>;

    /// Compare-and-swap rotation: atomically revoke the old token and record
    /// its successor hash in the same write. Returns false when the old token
    /// was not active, which means a concurrent rotation won or the token was
    /// already revoked/expired.
    async fn mark_rotated(&self, old_hash: &str, new_hash: &str) -> Result<bool>;
}
