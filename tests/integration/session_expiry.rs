//! Silent session expiry and its recovery path.
//!
//! When the session dies server-side, the next token acquisition
//! observes it (the bridge re-validates every call), the fetch fails
//! as unauthorized, and the dashboard leaves for the login view with
//! no task data rendered.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use termtask::cache::TaskCache;
use termtask::dashboard::{Dashboard, Nav};
use termtask::session::http::HttpSessionProvider;
use termtask::session::{SessionProvider, SessionState};
use termtask::store::http::HttpTaskStore;
use termtask::token::{BearerToken, TokenBridge};
use termtask_proto::auth::Credentials;

async fn start_server() -> (Url, tokio::task::JoinHandle<()>) {
    let (addr, handle) = termtask_server::server::start_server("127.0.0.1:0", "it-secret")
        .await
        .expect("failed to start server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    (base, handle)
}

async fn signed_in_stack(base: &Url) -> (Arc<HttpSessionProvider>, HttpTaskStore) {
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client");
    let provider = Arc::new(HttpSessionProvider::new(http.clone(), base.clone()));
    provider
        .sign_up(&Credentials {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .expect("sign up");
    (provider, HttpTaskStore::new(http, base.clone()))
}

#[tokio::test]
async fn token_bridge_reports_absent_after_expiry() {
    let (base, _server) = start_server().await;
    let (provider, _store) = signed_in_stack(&base).await;
    let bridge = TokenBridge::new(Arc::clone(&provider));

    assert!(bridge.acquire().await.unwrap().is_some());

    // The session dies server-side; nothing client-side is told.
    provider.sign_out().await.unwrap();

    // Structured absent, not an error.
    assert!(bridge.acquire().await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_fetch_redirects_with_no_task_data() {
    let (base, _server) = start_server().await;
    let (provider, store) = signed_in_stack(&base).await;
    let (mut dashboard, _notices) = Dashboard::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
        16,
    );

    // Establish a working dashboard first.
    dashboard.create_task("task", None).await.unwrap();
    let session = provider.current_session().await.unwrap();
    assert_eq!(dashboard.mount(&session).await, Nav::Stay);
    assert_eq!(dashboard.tasks().len(), 1);

    // Session expires silently; the next forced fetch recovers by
    // redirecting, leaving no task data behind.
    provider.sign_out().await.unwrap();
    let nav = dashboard.refresh().await;
    assert_eq!(nav, Nav::Login);
    assert!(dashboard.tasks().is_empty());
}

#[tokio::test]
async fn mount_with_absent_session_redirects_immediately() {
    let (base, _server) = start_server().await;
    // Fresh client, no cookie, no sign-up.
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client");
    let provider = Arc::new(HttpSessionProvider::new(http.clone(), base.clone()));
    let store = HttpTaskStore::new(http, base.clone());

    let session = provider.current_session().await.unwrap();
    assert_eq!(session, SessionState::Absent);

    let (mut dashboard, _notices) = Dashboard::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
        16,
    );
    assert_eq!(dashboard.mount(&session).await, Nav::Login);
}

#[tokio::test]
async fn forged_bearer_token_reads_as_unauthorized() {
    let (base, _server) = start_server().await;
    let (_provider, store) = signed_in_stack(&base).await;

    let forged = BearerToken::new("definitely-not-a-jwt".to_string());
    let err = termtask::store::TaskStore::list(&store, &forged)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}
