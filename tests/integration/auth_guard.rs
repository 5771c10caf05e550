//! Auth flow guarantees: duplicate-submit suppression and the generic
//! failure message.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use termtask::auth::{AuthError, AuthFlow, GENERIC_AUTH_MESSAGE, SubmitOutcome};
use termtask::session::http::HttpSessionProvider;
use termtask::session::stub::StubSessionProvider;

async fn start_server() -> (Url, tokio::task::JoinHandle<()>) {
    let (addr, handle) = termtask_server::server::start_server("127.0.0.1:0", "it-secret")
        .await
        .expect("failed to start server");
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    (base, handle)
}

fn make_provider(base: &Url) -> Arc<HttpSessionProvider> {
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client");
    Arc::new(HttpSessionProvider::new(http, base.clone()))
}

#[tokio::test]
async fn sign_up_then_sign_in_over_http() {
    let (base, _server) = start_server().await;
    let flow = AuthFlow::new(make_provider(&base));

    let outcome = flow.sign_up("alice@example.com", "hunter2").await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::SignedIn(_)));

    // A second browser signs in with the same account.
    let flow = AuthFlow::new(make_provider(&base));
    let outcome = flow.sign_in("alice@example.com", "hunter2").await.unwrap();
    match outcome {
        SubmitOutcome::SignedIn(user) => assert_eq!(user.email, "alice@example.com"),
        SubmitOutcome::Suppressed => panic!("submit was wrongly suppressed"),
    }
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let (base, _server) = start_server().await;
    let signup_flow = AuthFlow::new(make_provider(&base));
    signup_flow.sign_up("alice@example.com", "hunter2").await.unwrap();

    let flow = AuthFlow::new(make_provider(&base));
    let wrong_password = flow
        .sign_in("alice@example.com", "wrong")
        .await
        .unwrap_err()
        .to_string();
    let unknown_email = flow
        .sign_in("nobody@example.com", "hunter2")
        .await
        .unwrap_err()
        .to_string();

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password, GENERIC_AUTH_MESSAGE);
}

#[tokio::test]
async fn taken_email_on_sign_up_uses_the_same_message() {
    let (base, _server) = start_server().await;
    let flow = AuthFlow::new(make_provider(&base));
    flow.sign_up("alice@example.com", "hunter2").await.unwrap();

    let second = AuthFlow::new(make_provider(&base));
    let err = second.sign_up("alice@example.com", "other").await.unwrap_err();
    assert_eq!(err.to_string(), GENERIC_AUTH_MESSAGE);
}

#[tokio::test]
async fn unreachable_identity_endpoint_is_a_network_error_not_bad_credentials() {
    let base = Url::parse("http://127.0.0.1:1/").unwrap();
    let flow = AuthFlow::new(make_provider(&base));
    let err = flow.sign_in("alice@example.com", "hunter2").await.unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)));
    assert_ne!(err.to_string(), GENERIC_AUTH_MESSAGE);
}

#[tokio::test]
async fn rapid_double_submit_issues_exactly_one_request() {
    // The stub provider counts requests and can be slowed down, making
    // the in-flight window deterministic.
    let provider = Arc::new(
        StubSessionProvider::new().with_sign_in_delay(Duration::from_millis(80)),
    );
    provider.register_account("alice@example.com", "hunter2");
    let flow = Arc::new(AuthFlow::new(Arc::clone(&provider)));

    let first = {
        let flow = Arc::clone(&flow);
        tokio::spawn(async move { flow.sign_in("alice@example.com", "hunter2").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = flow.sign_in("alice@example.com", "hunter2").await.unwrap();

    assert_eq!(second, SubmitOutcome::Suppressed);
    assert!(matches!(
        first.await.unwrap().unwrap(),
        SubmitOutcome::SignedIn(_)
    ));
    assert_eq!(provider.sign_in_calls(), 1);
}

#[tokio::test]
async fn guard_frees_up_for_sequential_submits() {
    let (base, _server) = start_server().await;
    let flow = AuthFlow::new(make_provider(&base));
    flow.sign_up("alice@example.com", "hunter2").await.unwrap();

    let login = AuthFlow::new(make_provider(&base));
    login.sign_in("alice@example.com", "wrong").await.unwrap_err();
    // The failed attempt released the guard; a retry goes through.
    let outcome = login.sign_in("alice@example.com", "hunter2").await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::SignedIn(_)));
}
