use crate::domain::password::PasswordHasher;
use anyhow::Result;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Infrastructure service for password hashing and verification
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    /// Hash a plain text password using Argon2 with a fresh salt
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2::password_hash::PasswordHasher::hash_password(
            &argon2,
            password.as_bytes(),
            &salt,
        )
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash. A malformed stored hash
    /// verifies as false rather than erroring, so login keeps its uniform
    /// failure path.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return Ok(false);
        };

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
