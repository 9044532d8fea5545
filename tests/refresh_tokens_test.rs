mod common;

use cattos::domain::tokens::{NewRefreshToken, RefreshTokenRepository};
use cattos::domain::users::{NewUser, UserRepository};
use cattos::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use cattos::infrastructure::repositories::users::PostgresUserRepository;
use serial_test::serial;
use time::OffsetDateTime;
use uuid::Uuid;

/// Helper function to create a test user
async fn create_test_user(pool: &sqlx::PgPool) -> Uuid {
    let repo = PostgresUserRepository::new(pool.clone());
    let suffix = Uuid::new_v4();
    let new_user = NewUser {
        email: format!("test_{}@example.com", suffix),
        username: format!("testuser_{}", suffix),
        display_name: format!("testuser_{}", suffix),
        password_hash: "hashed_password".to_string(),
    };

    let user = repo.create(new_user).await.unwrap();
    user.id
}

fn new_token(user_id: Uuid, hash: &str, days: i64) -> NewRefreshToken {
    NewRefreshToken {
        user_id,
        token_hash: hash.to_string(),
        expires_at: OffsetDateTime::now_utc() + time::Duration::days(days),
    }
}

#[tokio::test]
#[serial]
async fn test_create_and_find_refresh_token() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let user_id = create_test_user(&pool).await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    let created = repo
        .create(new_token(user_id, "test_hash_123", 30))
        .await
        .unwrap();
    assert_eq!(created.user_id, user_id);
    assert!(created.revoked_at.is_none());
    assert!(created.replaced_by_hash.is_none());

    let found = repo.find_by_hash("test_hash_123").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(found.is_active(OffsetDateTime::now_utc()));

    assert!(repo.find_by_hash("unknown_hash").await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_revoke_only_affects_active_rows() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let user_id = create_test_user(&pool).await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    repo.create(new_token(user_id, "revocable", 30)).await.unwrap();

    assert!(repo.revoke("revocable").await.unwrap());
    // Already revoked and unknown hashes both report no change.
    assert!(!repo.revoke("revocable").await.unwrap());
    assert!(!repo.revoke("unknown").await.unwrap());

    let row = repo.find_by_hash("revocable").await.unwrap().unwrap();
    assert!(row.revoked_at.is_some());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_mark_rotated_links_successor_once() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let user_id = create_test_user(&pool).await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    repo.create(new_token(user_id, "old_hash", 30)).await.unwrap();

    assert!(repo.mark_rotated("old_hash", "new_hash").await.unwrap());
    // The compare-and-swap refuses a second rotation of the same row.
    assert!(!repo.mark_rotated("old_hash", "another_hash").await.unwrap());

    let row = repo.find_by_hash("old_hash").await.unwrap().unwrap();
    assert!(row.revoked_at.is_some());
    assert_eq!(row.replaced_by_hash.as_deref(), Some("new_hash"));

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_mark_rotated_skips_expired_rows() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let user_id = create_test_user(&pool).await;
    let repo = PostgresRefreshTokenRepository::new(pool.clone());

    repo.create(new_token(user_id, "expired_hash", -1))
        .await
        .unwrap();

    assert!(!repo.mark_rotated("expired_hash", "new_hash").await.unwrap());

    common::cleanup_test_db(&pool).await;
}
