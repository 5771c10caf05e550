//! Logout teardown ordering.
//!
//! Logout must invalidate the cache and end the session before
//! navigation, and the invalidation + redirect must happen even when
//! ending the session fails at the transport level.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use termtask::cache::TaskCache;
use termtask::dashboard::{Dashboard, Nav};
use termtask::session::http::HttpSessionProvider;
use termtask::session::stub::{STUB_TOKEN, StubSessionProvider};
use termtask::session::{SessionProvider, SessionState};
use termtask::store::http::HttpTaskStore;
use termtask::store::memory::InMemoryTaskStore;
use termtask_proto::auth::Credentials;

async fn start_server() -> (Url, tokio::task::JoinHandle<()>) {
    let (addr, handle) = termtask_server::server::start_server("127.0.0.1:0", "it-secret")
        .await
        .expect("failed to start server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    (base, handle)
}

#[tokio::test]
async fn logout_over_http_tears_down_in_order() {
    let (base, _server) = start_server().await;
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
    let store = HttpTaskStore::new(http, base.clone());

    let (mut dashboard, _notices) = Dashboard::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
        16,
    );
    dashboard.create_task("task", None).await.unwrap();
    dashboard.refresh().await;
    assert_eq!(dashboard.tasks().len(), 1);

    let nav = dashboard.logout().await;
    assert_eq!(nav, Nav::Login);
    assert!(dashboard.tasks().is_empty());

    // The session really ended.
    assert_eq!(
        provider.current_session().await.unwrap(),
        SessionState::Absent
    );
}

#[tokio::test]
async fn logout_with_dead_identity_endpoint_still_invalidates_and_redirects() {
    let (base, server) = start_server().await;
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
    let store = HttpTaskStore::new(http, base.clone());

    let (mut dashboard, _notices) = Dashboard::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
        16,
    );
    dashboard.refresh().await;

    // The identity endpoint goes away; sign-out will fail.
    server.abort();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let nav = dashboard.logout().await;
    assert_eq!(nav, Nav::Login);
    assert!(dashboard.tasks().is_empty());
}

#[tokio::test]
async fn failed_sign_out_still_tears_down_and_redirects() {
    // The stub makes the ordering observable: sign-out fails, yet
    // teardown and navigation happen anyway.
    let provider = Arc::new(StubSessionProvider::ready("alice@example.com"));
    let (mut dashboard, _notices) = Dashboard::new(
        Arc::clone(&provider),
        InMemoryTaskStore::new(STUB_TOKEN),
        TaskCache::new(Duration::from_secs(30)),
        16,
    );
    dashboard.create_task("task", None).await.unwrap();
    dashboard.refresh().await;

    provider.set_sign_out_fails(true);
    let nav = dashboard.logout().await;

    assert_eq!(nav, Nav::Login);
    assert!(dashboard.tasks().is_empty());
    // Sign-out was attempted exactly once, after invalidation.
    assert_eq!(provider.sign_out_calls(), 1);
}
