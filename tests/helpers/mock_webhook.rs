#![allow(dead_code)]
//! Helpers around `wiremock` servers standing in for chat webhooks.

use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Starts a server accepting JSON POSTs on `hook_path`.
pub async fn start_webhook(hook_path: &str) -> MockServer {
    start_slow_webhook(hook_path, Duration::ZERO).await
}

/// Like [`start_webhook`], but every answer is held back for `delay`.
pub async fn start_slow_webhook(hook_path: &str, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(hook_path))
        .and(header("content-type", JSON_UTF8))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(&server)
        .await;
    server
}

/// Polls `server` until it has seen `count` requests or `wait` elapses.
///
/// Pushes are fire-and-forget, so they can land after the HTTP response.
pub async fn wait_for_requests(server: &MockServer, count: usize, wait: Duration) -> Vec<Request> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= count || tokio::time::Instant::now() >= deadline {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
