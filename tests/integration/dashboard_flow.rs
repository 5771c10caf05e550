//! Dashboard controller end-to-end over HTTP.
//!
//! Exercises the full mount → mutate → notify cycle against the
//! reference server, asserting list order, in-place replacement with
//! server-returned values, and notice dispatch.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use termtask::cache::TaskCache;
use termtask::dashboard::{Dashboard, LoadState, Nav};
use termtask::notify::{Notice, NoticeLevel};
use termtask::session::SessionProvider;
use termtask::session::http::HttpSessionProvider;
use termtask::store::http::HttpTaskStore;
use termtask_proto::auth::Credentials;
use termtask_proto::task::TaskPatch;

type HttpDashboard = Dashboard<HttpSessionProvider, HttpTaskStore>;

async fn start_server() -> (Url, tokio::task::JoinHandle<()>) {
    let (addr, handle) = termtask_server::server::start_server("127.0.0.1:0", "it-secret")
        .await
        .expect("failed to start server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    (base, handle)
}

async fn signed_in_dashboard(
    base: &Url,
) -> (HttpDashboard, mpsc::Receiver<Notice>, Arc<HttpSessionProvider>) {
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
    let (dashboard, notices) = Dashboard::new(
        Arc::clone(&provider),
        store,
        TaskCache::new(Duration::from_secs(30)),
        16,
    );
    (dashboard, notices, provider)
}

#[tokio::test]
async fn mount_ready_loads_the_list() {
    let (base, _server) = start_server().await;
    let (mut dashboard, _notices, provider) = signed_in_dashboard(&base).await;

    let session = provider.current_session().await.unwrap();
    let nav = dashboard.mount(&session).await;

    assert_eq!(nav, Nav::Stay);
    assert_eq!(*dashboard.state(), LoadState::Ready);
    assert!(dashboard.tasks().is_empty());
}

#[tokio::test]
async fn create_prepends_and_emits_success_notice() {
    let (base, _server) = start_server().await;
    let (mut dashboard, mut notices, _provider) = signed_in_dashboard(&base).await;
    dashboard.refresh().await;

    dashboard.create_task("older", None).await.unwrap();
    dashboard.create_task("newer", Some("details")).await.unwrap();

    assert_eq!(dashboard.tasks()[0].title, "newer");
    assert_eq!(dashboard.tasks()[0].description.as_deref(), Some("details"));
    assert_eq!(dashboard.tasks()[1].title, "older");

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);

    // The in-memory splice matches what the server would return.
    dashboard.refresh().await;
    assert_eq!(dashboard.tasks()[0].title, "newer");
    assert_eq!(dashboard.tasks()[1].title, "older");
}

#[tokio::test]
async fn toggle_replaces_with_the_authoritative_copy() {
    let (base, _server) = start_server().await;
    let (mut dashboard, _notices, _provider) = signed_in_dashboard(&base).await;
    dashboard.refresh().await;
    let id = dashboard.create_task("task", None).await.unwrap();

    dashboard.toggle_completed(id).await.unwrap();
    assert!(dashboard.tasks()[0].is_completed);
    // updated_at came from the server, not a local guess.
    assert!(dashboard.tasks()[0].updated_at >= dashboard.tasks()[0].created_at);

    dashboard.toggle_completed(id).await.unwrap();
    assert!(!dashboard.tasks()[0].is_completed);

    // Server agrees after a forced re-read.
    dashboard.refresh().await;
    assert!(!dashboard.tasks()[0].is_completed);
}

#[tokio::test]
async fn update_edits_in_place_preserving_order() {
    let (base, _server) = start_server().await;
    let (mut dashboard, _notices, _provider) = signed_in_dashboard(&base).await;
    dashboard.refresh().await;
    let first = dashboard.create_task("first", None).await.unwrap();
    dashboard.create_task("second", None).await.unwrap();

    let patch = TaskPatch {
        title: Some("first, renamed".to_string()),
        ..Default::default()
    };
    dashboard.update_task(first, &patch).await.unwrap();

    assert_eq!(dashboard.tasks()[0].title, "second");
    assert_eq!(dashboard.tasks()[1].title, "first, renamed");
}

#[tokio::test]
async fn delete_drops_the_row_and_survives_a_refresh() {
    let (base, _server) = start_server().await;
    let (mut dashboard, _notices, _provider) = signed_in_dashboard(&base).await;
    dashboard.refresh().await;
    let keep = dashboard.create_task("keep", None).await.unwrap();
    let doomed = dashboard.create_task("doomed", None).await.unwrap();

    dashboard.delete_task(doomed).await.unwrap();
    assert_eq!(dashboard.tasks().len(), 1);
    assert_eq!(dashboard.tasks()[0].id, keep);

    dashboard.refresh().await;
    assert_eq!(dashboard.tasks().len(), 1);
    assert_eq!(dashboard.tasks()[0].id, keep);
}

#[tokio::test]
async fn validation_failure_notifies_and_reraises() {
    let (base, _server) = start_server().await;
    let (mut dashboard, mut notices, _provider) = signed_in_dashboard(&base).await;
    dashboard.refresh().await;

    let err = dashboard.create_task("   ", None).await.unwrap_err();
    assert!(matches!(err, termtask::store::ApiError::Validation(_)));

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    // Nothing was spliced in.
    assert!(dashboard.tasks().is_empty());
}

#[tokio::test]
async fn full_session_cycle_mount_mutate_logout() {
    let (base, _server) = start_server().await;
    let (mut dashboard, _notices, provider) = signed_in_dashboard(&base).await;

    let session = provider.current_session().await.unwrap();
    assert_eq!(dashboard.mount(&session).await, Nav::Stay);

    dashboard.create_task("task", None).await.unwrap();
    assert_eq!(dashboard.tasks().len(), 1);

    assert_eq!(dashboard.logout().await, Nav::Login);
    assert!(dashboard.tasks().is_empty());

    // Mounting again with the (now absent) session redirects.
    let session = provider.current_session().await.unwrap();
    assert_eq!(dashboard.mount(&session).await, Nav::Login);
}
