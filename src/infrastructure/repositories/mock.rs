//! In-memory repositories used by unit and application tests.

use crate::domain::tokens::{NewRefreshToken, RefreshToken, RefreshTokenRepository};
use crate::domain::users::{CreateUserError, NewUser, User, UserRepository};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        let mut users = self.users.lock().unwrap();
        // Mirror the database unique indexes.
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(CreateUserError::EmailTaken);
        }
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(CreateUserError::UsernameTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            username: new_user.username,
            display_name: new_user.display_name,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn record_login(&self, id: Uuid) -> Result<(), anyhow::Error> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<Mutex<Vec<RefreshToken>>>,
}

impl MockRefreshTokenRepository {
    pub fn all(&self) -> Vec<RefreshToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let record = RefreshToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            revoked_at: None,
            replaced_by_hash: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tokens.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
        {
            Some(token) => {
                token.revoked_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_rotated(&self, old_hash: &str, new_hash: &str) -> Result<bool> {
        let now = OffsetDateTime::now_utc();
        let mut tokens = self.tokens.lock().unwrap();
        match tokens
            .iter_mut()
            .find(|t| t.token_hash == old_hash && t.revoked_at.is_none() && t.expires_at > now)
        {
            Some(token) => {
                token.revoked_at = Some(now);
                token.replaced_by_hash = Some(new_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
