use crate::config::Config;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::jwt::JwtTokenSigner;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub signer: Arc<JwtTokenSigner>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let signer = Arc::new(JwtTokenSigner::new(
            &config.jwt_secret,
            config.access_token_expiry,
        ));
        Self {
            pool,
            signer,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
