//! End-to-end API flow against the reference server.
//!
//! Covers the full lifecycle over real HTTP: sign-up, token issuance,
//! create/list/update/complete/delete, title boundaries, and ownership
//! isolation between users.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use termtask::api::TaskApi;
use termtask::cache::TaskCache;
use termtask::session::SessionProvider;
use termtask::session::http::HttpSessionProvider;
use termtask::store::http::HttpTaskStore;
use termtask::store::{ApiError, TaskStore};
use termtask_proto::auth::Credentials;
use termtask_proto::error::ErrorCode;
use termtask_proto::task::{MAX_TITLE_LENGTH, NewTask, TaskId, TaskPatch};

/// Start the reference server in-process and return its base URL.
async fn start_server() -> (Url, tokio::task::JoinHandle<()>) {
    let (addr, handle) = termtask_server::server::start_server("127.0.0.1:0", "it-secret")
        .await
        .expect("failed to start server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    (base, handle)
}

/// One simulated browser: a cookie-store client shared by the identity
/// provider and the task store.
fn make_stack(base: &Url) -> (Arc<HttpSessionProvider>, HttpTaskStore) {
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client");
    let provider = Arc::new(HttpSessionProvider::new(http.clone(), base.clone()));
    let store = HttpTaskStore::new(http, base.clone());
    (provider, store)
}

async fn sign_up(provider: &HttpSessionProvider, email: &str) {
    provider
        .sign_up(&Credentials {
            email: email.to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .expect("sign up");
}

#[tokio::test]
async fn create_then_list_round_trip() {
    let (base, _server) = start_server().await;
    let (provider, store) = make_stack(&base);
    let api = TaskApi::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
    );
    sign_up(&provider, "alice@example.com").await;

    api.create("Buy milk", None).await.unwrap();

    let tasks = api.list(true).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].description, None);
    assert!(!tasks[0].is_completed);
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let (base, _server) = start_server().await;
    let (provider, store) = make_stack(&base);
    let api = TaskApi::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
    );
    sign_up(&provider, "alice@example.com").await;

    // Create two tasks; the newest lands first.
    let first = api.create("First task", Some("with details")).await.unwrap();
    let second = api.create("Second task", None).await.unwrap();
    let tasks = api.list(true).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, second.id);
    assert_eq!(tasks[1].id, first.id);
    assert_eq!(tasks[1].description.as_deref(), Some("with details"));

    // Partial update returns the authoritative copy.
    let patch = TaskPatch {
        title: Some("First task, renamed".to_string()),
        ..Default::default()
    };
    let updated = api.update(first.id, &patch).await.unwrap();
    assert_eq!(updated.title, "First task, renamed");
    assert_eq!(updated.created_at, first.created_at);

    // Complete is idempotent.
    let done = api.complete(first.id).await.unwrap();
    assert!(done.is_completed);
    let done_again = api.complete(first.id).await.unwrap();
    assert!(done_again.is_completed);

    // Uncomplete is idempotent too.
    let undone = api.uncomplete(first.id).await.unwrap();
    assert!(!undone.is_completed);
    let undone_again = api.uncomplete(first.id).await.unwrap();
    assert!(!undone_again.is_completed);

    // Delete is permanent.
    api.delete(first.id).await.unwrap();
    let tasks = api.list(true).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, second.id);

    // A forced read reflects every mutation that happened.
    let tasks = api.list(true).await.unwrap();
    assert_eq!(tasks[0].id, second.id);
    assert!(!tasks[0].is_completed);
}

#[tokio::test]
async fn oversized_title_rejected_client_side() {
    let (base, _server) = start_server().await;
    let (provider, store) = make_stack(&base);
    let api = TaskApi::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
    );
    sign_up(&provider, "alice@example.com").await;

    let long_title = "x".repeat(MAX_TITLE_LENGTH + 1);
    let err = api.create(&long_title, None).await.unwrap_err();
    // Validation, not Remote: the request never reached the server.
    assert!(matches!(err, ApiError::Validation(_)));

    let max_title = "x".repeat(MAX_TITLE_LENGTH);
    let task = api.create(&max_title, None).await.unwrap();
    assert_eq!(task.title.chars().count(), MAX_TITLE_LENGTH);
}

#[tokio::test]
async fn server_revalidates_titles() {
    let (base, _server) = start_server().await;
    let (provider, store) = make_stack(&base);
    sign_up(&provider, "alice@example.com").await;
    let token = provider.issue_token().await.unwrap().expect("token");

    // Bypass client-side validation and hit the store directly.
    let draft = NewTask {
        title: "x".repeat(MAX_TITLE_LENGTH + 1),
        description: None,
    };
    let err = store.create(&token, &draft).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Remote {
            code: ErrorCode::Validation,
            ..
        }
    ));
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (base, _server) = start_server().await;
    let (provider, store) = make_stack(&base);
    let api = TaskApi::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
    );
    sign_up(&provider, "alice@example.com").await;

    let err = api.delete(TaskId::new()).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Remote {
            code: ErrorCode::NotFound,
            ..
        }
    ));
}

#[tokio::test]
async fn users_cannot_see_each_others_tasks() {
    let (base, _server) = start_server().await;

    let (alice_provider, alice_store) = make_stack(&base);
    let alice = TaskApi::new(
        Arc::clone(&alice_provider),
        alice_store,
        TaskCache::new(Duration::from_secs(30)),
    );
    sign_up(&alice_provider, "alice@example.com").await;
    let alice_task = alice.create("Alice's task", None).await.unwrap();

    let (bob_provider, bob_store) = make_stack(&base);
    let bob = TaskApi::new(
        Arc::clone(&bob_provider),
        bob_store,
        TaskCache::new(Duration::from_secs(30)),
    );
    sign_up(&bob_provider, "bob@example.com").await;

    assert!(bob.list(true).await.unwrap().is_empty());
    // Bob addressing Alice's task reads as not-found, not forbidden:
    // ids of other owners are indistinguishable from nonexistent ones.
    let err = bob.delete(alice_task.id).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Remote {
            code: ErrorCode::NotFound,
            ..
        }
    ));
    assert_eq!(alice.list(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (base, _server) = start_server().await;
    let (provider, _store) = make_stack(&base);
    sign_up(&provider, "alice@example.com").await;

    let (second_provider, _second_store) = make_stack(&base);
    let err = second_provider
        .sign_up(&Credentials {
            email: "alice@example.com".to_string(),
            password: "other".to_string(),
        })
        .await
        .unwrap_err();
    // Rejected without detail; the client shows one generic message.
    assert!(matches!(err, termtask::session::SessionError::Rejected));
}
