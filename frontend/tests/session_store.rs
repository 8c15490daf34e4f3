mod common;

use common::{body_json, Harness};
use serde_json::json;
use taskflow_web::gateway::Method;
use taskflow_web::{ClientError, KeyValueStore, MemoryStorage, TokenProvider};

#[test]
fn restores_logged_out_from_empty_storage() {
    let harness = Harness::logged_out();
    assert!(!harness.session.is_logged_in());
    assert_eq!(harness.session.username(), "");
}

#[test]
fn restores_logged_in_from_storage() {
    let harness = Harness::logged_in();
    assert!(harness.session.is_logged_in());
    assert_eq!(harness.session.token().as_deref(), Some("tok-123"));
    assert_eq!(harness.session.username(), "alice");
}

#[test]
fn username_without_token_is_still_logged_out() {
    let harness = Harness::new(MemoryStorage::with_entries([("taskflow_username", "bob")]));
    assert!(!harness.session.is_logged_in());
}

#[test]
fn empty_stored_token_restores_logged_out() {
    let harness = Harness::new(MemoryStorage::with_entries([
        ("taskflow_token", ""),
        ("taskflow_username", "alice"),
    ]));
    assert!(!harness.session.is_logged_in());
    assert_eq!(harness.session.token(), None);
}

#[tokio::test]
async fn empty_stored_token_never_reaches_the_server() {
    let harness = Harness::new(MemoryStorage::with_entries([("taskflow_token", "")]));

    harness.tasks.fetch_tasks("2024-01-01").await;

    assert_eq!(harness.tasks.error().as_deref(), Some("not authenticated"));
    assert!(harness.transport.requests().is_empty());
}

#[tokio::test]
async fn login_persists_token_and_server_username() {
    let harness = Harness::logged_out();
    harness.transport.reply(
        200,
        json!({
            "message": "logged in",
            "token": "jwt-abc",
            "user": { "id": 1, "username": "Alice", "email": "alice@example.com" }
        }),
    );

    harness.session.login("alice", "secret1").await.unwrap();

    assert!(harness.session.is_logged_in());
    assert_eq!(harness.session.token().as_deref(), Some("jwt-abc"));
    assert_eq!(harness.session.username(), "Alice");
    assert_eq!(harness.storage.get("taskflow_token").as_deref(), Some("jwt-abc"));
    assert_eq!(harness.storage.get("taskflow_username").as_deref(), Some("Alice"));

    let request = harness.transport.last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, "http://api.test/login");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        body_json(&request),
        json!({ "username": "alice", "password": "secret1" })
    );
}

#[tokio::test]
async fn failed_login_leaves_state_and_storage_untouched() {
    let harness = Harness::logged_out();
    harness
        .transport
        .reply(401, json!({ "error": "invalid username or password" }));

    let err = harness.session.login("alice", "wrong").await.unwrap_err();

    assert_eq!(
        err,
        ClientError::Request {
            status: 401,
            message: "invalid username or password".to_string()
        }
    );
    assert!(!harness.session.is_logged_in());
    assert!(harness.storage.is_empty());
}

#[tokio::test]
async fn failed_login_keeps_an_existing_session() {
    let harness = Harness::logged_in();
    harness
        .transport
        .fail(ClientError::Network("connection refused".to_string()));

    assert!(harness.session.login("mallory", "x").await.is_err());

    assert_eq!(harness.session.token().as_deref(), Some("tok-123"));
    assert_eq!(harness.storage.get("taskflow_username").as_deref(), Some("alice"));
}

#[test]
fn logout_clears_state_and_storage() {
    let harness = Harness::logged_in();

    harness.session.logout();

    assert!(!harness.session.is_logged_in());
    assert_eq!(harness.session.username(), "");
    assert!(harness.storage.is_empty());
    assert!(harness.transport.requests().is_empty());
}

#[test]
fn logout_is_idempotent() {
    let harness = Harness::logged_out();

    harness.session.logout();
    harness.session.logout();

    assert!(!harness.session.is_logged_in());
    assert!(harness.storage.is_empty());
}

#[tokio::test]
async fn register_posts_all_three_fields() {
    let harness = Harness::logged_out();
    harness.transport.reply(
        200,
        json!({
            "message": "registered",
            "user": { "id": 4, "username": "carol", "email": "carol@example.com" }
        }),
    );

    let response = harness
        .session
        .auth_api()
        .register("carol", "secret1", "carol@example.com")
        .await
        .unwrap();

    assert_eq!(response.user.id, 4);
    let request = harness.transport.last_request();
    assert_eq!(request.url, "http://api.test/register");
    assert_eq!(
        body_json(&request),
        json!({ "username": "carol", "password": "secret1", "email": "carol@example.com" })
    );
    // Registering does not log anyone in.
    assert!(!harness.session.is_logged_in());
}
