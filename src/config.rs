use anyhow::{Context, Result, anyhow};
use std::env;

/// Deployment environment, controls cookie `Secure` and whether the refresh
/// secret is echoed in response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Environment-derived configuration, built once at startup and passed into
/// the session use cases. Business logic never reads the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry: i64,
    pub refresh_cookie_name: String,
}

const DEFAULT_ACCESS_EXPIRY: i64 = 15 * 60;
const DEFAULT_REFRESH_DAYS: i64 = 30;

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let access_token_expiry = match env::var("ACCESS_TOKEN_EXPIRES") {
            Ok(raw) => parse_expiry(&raw)?,
            Err(_) => DEFAULT_ACCESS_EXPIRY,
        };

        let refresh_days: i64 = env::var("REFRESH_TOKEN_EXPIRES_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_DAYS.to_string())
            .parse()
            .context("REFRESH_TOKEN_EXPIRES_DAYS must be a number")?;

        let refresh_cookie_name =
            env::var("REFRESH_COOKIE_NAME").unwrap_or_else(|_| "refreshToken".to_string());

        Ok(Self {
            port,
            environment: Environment::from_env(),
            jwt_secret,
            access_token_expiry,
            refresh_token_expiry: refresh_days * 24 * 60 * 60,
            refresh_cookie_name,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Parse a token lifetime: either raw seconds ("900") or a duration string
/// with an s/m/h/d suffix ("15m", "7d").
pub fn parse_expiry(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<i64>() {
        if seconds <= 0 {
            return Err(anyhow!("expiry must be positive: {raw}"));
        }
        return Ok(seconds);
    }

    // Split on the char boundary of the final character; a multibyte suffix
    // must come back as an error, not a slicing panic.
    let Some((idx, unit)) = raw.char_indices().last() else {
        return Err(anyhow!("invalid expiry duration: {raw}"));
    };
    let value: i64 = raw[..idx]
        .parse()
        .map_err(|_| anyhow!("invalid expiry duration: {raw}"))?;
    if value <= 0 {
        return Err(anyhow!("expiry must be positive: {raw}"));
    }

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(anyhow!("invalid expiry unit in: {raw}")),
    };

    Ok(value * multiplier)
}
