//! Account upsert flow integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST). They exercise the login upsert and
//! bearer verification against real storage.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use vocab_quiz::services::AccountService;

mod common;
use common::test_db;

/// Generate a unique identity for test isolation.
fn unique_google_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("ext-{}", nanos)
}

#[tokio::test]
async fn test_first_login_creates_zeroed_record() {
    require_emulator!();

    let db = test_db().await;
    let accounts = AccountService::new(db.clone());
    let google_id = unique_google_id();

    // Initially, no record for this identity
    let before = db.get_user(&google_id).await.unwrap();
    assert!(before.is_none(), "Record should not exist before login");

    let user = accounts.login_upsert(&google_id, "tok-A").await.unwrap();
    assert_eq!(user.google_id, google_id);
    assert_eq!(user.access_token, "tok-A");

    let stored = db.get_user(&google_id).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "tok-A");
    assert_eq!(stored.num_correct, 0);
    assert_eq!(stored.num_answered, 0);
    assert!(stored.answer_history.is_empty());
}

#[tokio::test]
async fn test_second_login_rotates_token_in_place() {
    require_emulator!();

    let db = test_db().await;
    let accounts = AccountService::new(db.clone());
    let google_id = unique_google_id();

    accounts.login_upsert(&google_id, "tok-A").await.unwrap();

    // Simulate quiz progress between the two logins
    let mut user = db.get_user(&google_id).await.unwrap().unwrap();
    user.record_answer("ephemeral", true, "2024-01-15T10:01:00Z");
    user.record_answer("ubiquitous", false, "2024-01-15T10:02:00Z");
    db.upsert_user(&user).await.unwrap();

    accounts.login_upsert(&google_id, "tok-B").await.unwrap();

    // Same record: token rotated, progress untouched
    let stored = db.get_user(&google_id).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "tok-B");
    assert_eq!(stored.num_correct, 1);
    assert_eq!(stored.num_answered, 2);
    assert_eq!(stored.answer_history.len(), 2);
    assert_eq!(stored.created_at, user.created_at);
}

#[tokio::test]
async fn test_bearer_resolution_tracks_rotation() {
    require_emulator!();

    let db = test_db().await;
    let accounts = AccountService::new(db.clone());
    let google_id = unique_google_id();

    accounts.login_upsert(&google_id, "tok-A").await.unwrap();

    let resolved = accounts.verify_bearer("tok-A").await.unwrap();
    assert_eq!(resolved.google_id, google_id);

    accounts.login_upsert(&google_id, "tok-B").await.unwrap();

    // The old token no longer resolves; the new one does.
    assert!(accounts.verify_bearer("tok-A").await.is_none());
    let resolved = accounts.verify_bearer("tok-B").await.unwrap();
    assert_eq!(resolved.google_id, google_id);

    // A token that was never issued resolves to nothing.
    assert!(accounts.verify_bearer("tok-never-issued").await.is_none());
}

#[tokio::test]
async fn test_upsert_idempotence_leaves_one_record() {
    require_emulator!();

    let db = test_db().await;
    let accounts = AccountService::new(db.clone());
    let google_id = unique_google_id();

    accounts.login_upsert(&google_id, "tok-A").await.unwrap();
    accounts.login_upsert(&google_id, "tok-B").await.unwrap();

    let stored = db.get_user(&google_id).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "tok-B");

    // The identity is the document id, so a second record for the same
    // identity cannot exist; the rotated token proves the same document
    // was written twice.
    assert!(accounts.verify_bearer("tok-A").await.is_none());
}

#[tokio::test]
async fn test_me_endpoint_resolves_fresh_token() {
    require_emulator!();

    let db = test_db().await;
    let (app, state) = common::create_app_with_db(db);
    let google_id = unique_google_id();

    let user = state
        .accounts
        .login_upsert(&google_id, "tok-fresh")
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users/me")
                .header(header::COOKIE, format!("accessToken={}", user.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let me: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(me["google_id"], google_id);
    assert_eq!(me["num_correct"], 0);
    assert_eq!(me["num_answered"], 0);

    // Any other token string is unauthenticated.
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users/me")
                .header(header::COOKIE, "accessToken=tok-other")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_answer_recording_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let (app, state) = common::create_app_with_db(db.clone());
    let google_id = unique_google_id();

    let user = state
        .accounts
        .login_upsert(&google_id, "tok-quiz")
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users/me/answers")
                .header(header::COOKIE, format!("accessToken={}", user.access_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"term":"ephemeral","correct":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let progress: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(progress["num_correct"], 1);
    assert_eq!(progress["num_answered"], 1);

    let stored = db.get_user(&google_id).await.unwrap().unwrap();
    assert_eq!(stored.num_correct, 1);
    assert_eq!(stored.num_answered, 1);
    assert_eq!(stored.answer_history.len(), 1);
    assert_eq!(stored.answer_history[0].term, "ephemeral");
}
