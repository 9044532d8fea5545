use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

/// Subset of a user record safe to return to clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
}

/// Insert failure split out so uniqueness violations can surface as 409
/// instead of a generic 500.
#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("Email already in use")]
    EmailTaken,
    #[error("Username already in use")]
    UsernameTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, relying on the unique constraints to reject
    /// duplicate email/username.
    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error>;

    /// Stamp `last_login_at` after a successful credential check.
    async fn record_login(&self, id: Uuid) -> Result<(), anyhow::Error>;
}
