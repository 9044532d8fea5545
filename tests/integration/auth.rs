use crate::common;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

fn test_app(pool: sqlx::PgPool) -> Router {
    cattos::presentation::router::app(common::create_test_app_state(pool))
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn refresh_cookie_value(response: &Response<Body>) -> Option<String> {
    let cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (name_value, _) = cookie.split_once(';')?;
    let (name, value) = name_value.split_once('=')?;
    (name == "refreshToken").then(|| value.to_string())
}

fn register_body(email: &str, username: &str) -> serde_json::Value {
    json!({
        "email": email,
        "username": username,
        "password": "password123"
    })
}

#[tokio::test]
#[serial]
async fn test_register_sets_cookie_and_returns_tokens() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("refresh cookie missing")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/api/v1/auth"));

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["user"]["username"], "cat");
    assert!(json["data"]["user"]["password_hash"].is_null());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_register_duplicate_email_conflicts() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "othercat"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["detail"], "Email already in use");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_register_short_password_is_400() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "email": "cat@example.com",
            "username": "cat",
            "password": "short"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_failures_are_indistinguishable() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    post_json(
        &app,
        "/api/v1/auth/register",
        register_body("real@x.com", "realcat"),
    )
    .await;

    let unknown = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"identifier": "nonexistent@x.com", "password": "anything"}),
    )
    .await;
    let wrong = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"identifier": "real@x.com", "password": "wrongpassword"}),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown_body = body_json(unknown).await;
    let wrong_body = body_json(wrong).await;
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["errors"][0]["detail"], "Invalid credentials");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_by_username_succeeds() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"identifier": "cat", "password": "password123"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], "cat@example.com");
    assert_eq!(json["data"]["token_type"], "Bearer");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_rotates_cookie_token() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let register = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;
    let secret = refresh_cookie_value(&register).expect("no refresh cookie");

    let refresh = |secret: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .uri("/api/v1/auth/refresh")
                    .method("POST")
                    .header(header::COOKIE, format!("refreshToken={secret}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let first = refresh(secret.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let rotated = refresh_cookie_value(&first).expect("no rotated cookie");
    assert_ne!(rotated, secret);

    // The spent secret is rejected; its successor still works.
    let replay = refresh(secret).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let second = refresh(rotated).await;
    assert_eq!(second.status(), StatusCode::OK);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_accepts_body_token() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let register = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;
    let json = body_json(register).await;
    let secret = json["data"]["refresh_token"]
        .as_str()
        .expect("refresh token not echoed outside production")
        .to_string();

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": secret}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_without_token_is_401() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/refresh")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_logout_is_idempotent_and_clears_cookie() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let register = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;
    let secret = refresh_cookie_value(&register).expect("no refresh cookie");

    let logout = |secret: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .uri("/api/v1/auth/logout")
                    .method("POST")
                    .header(header::COOKIE, format!("refreshToken={secret}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let first = logout(secret.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let cleared = first
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // Second logout with the same spent secret still succeeds.
    let second = logout(secret.clone()).await;
    assert_eq!(second.status(), StatusCode::OK);

    // The revoked token can no longer be refreshed.
    let refresh = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/refresh")
                .method("POST")
                .header(header::COOKIE, format!("refreshToken={secret}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_me_requires_and_honors_bearer_token() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = test_app(pool.clone());

    let register = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("cat@example.com", "cat"),
    )
    .await;
    let json = body_json(register).await;
    let access_token = json["data"]["access_token"].as_str().unwrap().to_string();

    let me = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(me.status(), StatusCode::OK);
    let json = body_json(me).await;
    assert_eq!(json["data"]["username"], "cat");

    let anonymous = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}
