use crate::application::session::login::{LoginRequest, LoginUseCase};
use crate::application::session::logout::LogoutUseCase;
use crate::application::session::refresh::RefreshUseCase;
use crate::application::session::register::{RegisterRequest, RegisterUseCase};
use crate::application::session::store::RefreshTokenStore;
use crate::application::session::token_utils::TokenPair;
use crate::domain::password::PasswordHasher;
use crate::domain::tokens::TokenSigner;
use crate::domain::users::{PublicUser, UserRepository};
use crate::infrastructure::password::Argon2PasswordHasher;
use crate::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use crate::infrastructure::state::AppState;
use crate::presentation::cookies::{clear_refresh_cookie, extract_refresh_cookie, refresh_cookie};
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::ApiResponse;
use crate::shared::validation::ValidatedJson;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Session response body. The refresh secret normally travels only in the
/// cookie; outside production it is echoed here for non-browser clients.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SessionResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Body fallback for clients that cannot send the refresh cookie.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct RefreshTokenBody {
    #[serde(default, rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

fn session_resource(
    state: &AppState,
    user: Option<PublicUser>,
    tokens: &TokenPair,
) -> SessionResource {
    SessionResource {
        user,
        access_token: tokens.access_token.clone(),
        token_type: tokens.token_type.clone(),
        expires_in: tokens.expires_in,
        refresh_token: (!state.config.is_production()).then(|| tokens.refresh_secret.clone()),
    }
}

fn refresh_store(state: &AppState) -> RefreshTokenStore {
    RefreshTokenStore::new(
        Arc::new(PostgresRefreshTokenRepository::new(state.pool.clone())),
        state.config.refresh_token_expiry,
    )
}

fn signer(state: &AppState) -> Arc<dyn TokenSigner> {
    state.signer.clone() as Arc<dyn TokenSigner>
}

/// Resolve the refresh secret from the cookie, falling back to the body.
fn resolve_refresh_secret(
    state: &AppState,
    headers: &HeaderMap,
    body: Option<RefreshTokenBody>,
) -> Option<String> {
    extract_refresh_cookie(headers, &state.config.refresh_cookie_name)
        .or(body.and_then(|b| b.refresh_token))
}

/// Register handler
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResource),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email or username already in use", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_repo = Arc::new(PostgresUserRepository::new(state.pool.clone()));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let use_case = RegisterUseCase::new(
        user_repo,
        password_hasher,
        signer(&state),
        refresh_store(&state),
        state.config.access_token_expiry,
    );

    let output = use_case.execute(req).await?;

    let cookie = refresh_cookie(
        &state.config,
        &output.tokens.refresh_secret,
        output.tokens.refresh_expires_at,
    )
    .map_err(|e| AppError::InternalServerError(e.into()))?;
    let body = session_resource(&state, Some(output.user), &output.tokens);

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::new(body)),
    ))
}

/// Login handler
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResource),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_repo = Arc::new(PostgresUserRepository::new(state.pool.clone()));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let use_case = LoginUseCase::new(
        user_repo,
        password_hasher,
        signer(&state),
        refresh_store(&state),
        state.config.access_token_expiry,
    );

    let output = use_case.execute(req).await?;

    let cookie = refresh_cookie(
        &state.config,
        &output.tokens.refresh_secret,
        output.tokens.refresh_expires_at,
    )
    .map_err(|e| AppError::InternalServerError(e.into()))?;
    let body = session_resource(&state, Some(output.user), &output.tokens);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::new(body)),
    ))
}

/// Refresh handler; rotates the refresh token from cookie or body
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshTokenBody,
    responses(
        (status = 200, description = "Token refreshed", body = SessionResource),
        (status = 401, description = "Missing, invalid, or expired refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshTokenBody>>,
) -> Result<impl IntoResponse, AppError> {
    let secret = resolve_refresh_secret(&state, &headers, body.map(|Json(b)| b))
        .ok_or_else(|| AppError::Unauthenticated("Missing refresh token".to_string()))?;

    let use_case = RefreshUseCase::new(
        signer(&state),
        refresh_store(&state),
        state.config.access_token_expiry,
    );

    let tokens = use_case.execute(&secret).await?;

    let cookie = refresh_cookie(&state.config, &tokens.refresh_secret, tokens.refresh_expires_at)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    let body = session_resource(&state, None, &tokens);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::new(body)),
    ))
}

/// Logout handler; idempotent and silent about unknown tokens
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = RefreshTokenBody,
    responses(
        (status = 200, description = "Session ended"),
        (status = 401, description = "No refresh token supplied", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshTokenBody>>,
) -> Result<impl IntoResponse, AppError> {
    let secret = resolve_refresh_secret(&state, &headers, body.map(|Json(b)| b))
        .ok_or_else(|| AppError::Unauthenticated("Missing refresh token".to_string()))?;

    LogoutUseCase::new(refresh_store(&state))
        .execute(&secret)
        .await?;

    // Clear the cookie even when the token was already spent.
    let cookie = clear_refresh_cookie(&state.config)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::new(json!({ "message": "Logged out" }))),
    ))
}

/// Current user handler
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Caller's public profile", body = PublicUser),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user_repo = PostgresUserRepository::new(state.pool.clone());

    let user = user_repo
        .find_by_id(auth_user.user_id)
        .await
        .map_err(AppError::InternalServerError)?
        .ok_or(AppError::NotFound)?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(PublicUser::from(user))),
    ))
}
