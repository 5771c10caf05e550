//! Cache discipline over real HTTP.
//!
//! The server's task table counts list calls, so these tests assert
//! exactly how many reads crossed the wire: two reads within the TTL
//! cost one call, any mutation forces the next read back to the
//! server, and a forced refresh always goes out.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use termtask::api::TaskApi;
use termtask::cache::TaskCache;
use termtask::session::SessionProvider;
use termtask::session::http::HttpSessionProvider;
use termtask::store::http::HttpTaskStore;
use termtask_proto::auth::Credentials;
use termtask_proto::task::TaskPatch;
use termtask_server::server::AppState;

/// Start the server keeping a handle on its state for observation.
async fn start_observable_server() -> (Url, Arc<AppState>, tokio::task::JoinHandle<()>) {
    let state = Arc::new(AppState::new("it-secret"));
    let (addr, handle) =
        termtask_server::server::start_server_with_state("127.0.0.1:0", Arc::clone(&state))
            .await
            .expect("failed to start server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    (base, state, handle)
}

async fn make_signed_in_api(
    base: &Url,
    ttl: Duration,
) -> TaskApi<HttpSessionProvider, HttpTaskStore> {
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
    TaskApi::new(provider, store, TaskCache::new(ttl))
}

#[tokio::test]
async fn two_reads_within_ttl_issue_exactly_one_network_call() {
    let (base, state, _server) = start_observable_server().await;
    let api = make_signed_in_api(&base, Duration::from_secs(30)).await;

    api.list(true).await.unwrap();
    api.list(false).await.unwrap();

    assert_eq!(state.tasks.list_calls(), 1);
}

#[tokio::test]
async fn read_after_each_mutation_always_hits_the_server() {
    let (base, state, _server) = start_observable_server().await;
    let api = make_signed_in_api(&base, Duration::from_secs(30)).await;

    let task = api.create("task", None).await.unwrap();

    api.list(false).await.unwrap();
    assert_eq!(state.tasks.list_calls(), 1);

    api.complete(task.id).await.unwrap();
    api.list(false).await.unwrap();
    assert_eq!(state.tasks.list_calls(), 2);

    api.uncomplete(task.id).await.unwrap();
    api.list(false).await.unwrap();
    assert_eq!(state.tasks.list_calls(), 3);

    let patch = TaskPatch {
        title: Some("renamed".to_string()),
        ..Default::default()
    };
    api.update(task.id, &patch).await.unwrap();
    api.list(false).await.unwrap();
    assert_eq!(state.tasks.list_calls(), 4);

    api.delete(task.id).await.unwrap();
    api.list(false).await.unwrap();
    assert_eq!(state.tasks.list_calls(), 5);
}

#[tokio::test]
async fn force_refresh_bypasses_a_fresh_cache() {
    let (base, state, _server) = start_observable_server().await;
    let api = make_signed_in_api(&base, Duration::from_secs(30)).await;

    api.list(true).await.unwrap();
    api.list(true).await.unwrap();
    api.list(true).await.unwrap();

    assert_eq!(state.tasks.list_calls(), 3);
}

#[tokio::test]
async fn expired_entry_refetches() {
    let (base, state, _server) = start_observable_server().await;
    let api = make_signed_in_api(&base, Duration::from_millis(50)).await;

    api.list(true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    api.list(false).await.unwrap();

    assert_eq!(state.tasks.list_calls(), 2);
}

#[tokio::test]
async fn cached_reads_see_the_same_snapshot() {
    let (base, _state, _server) = start_observable_server().await;
    let api = make_signed_in_api(&base, Duration::from_secs(30)).await;

    api.create("task", None).await.unwrap();
    let first = api.list(true).await.unwrap();
    let second = api.list(false).await.unwrap();
    assert_eq!(first, second);
}
