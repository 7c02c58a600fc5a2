//! Best-effort delivery of envelopes to chat webhooks.

use crate::notification::Envelope;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, instrument};

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Delivers an envelope to a webhook URL.
///
/// `push` is blocking and must run off the async executor (the interceptor
/// calls it from `spawn_blocking`). Implementations swallow their own
/// failures; the caller never learns whether delivery succeeded.
pub trait WebhookPusher: Send + Sync {
    fn push(&self, envelope: &Envelope, url: &str);
}

/// Pushes envelopes with a blocking `reqwest` client.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpWebhookPusher;

impl HttpWebhookPusher {
    pub fn new() -> Self {
        Self
    }
}

impl WebhookPusher for HttpWebhookPusher {
    #[instrument(skip(self, envelope), fields(channel = %envelope.kind()))]
    fn push(&self, envelope: &Envelope, url: &str) {
        let body = match serde_json::to_vec(envelope) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Marshal push content failed");
                metrics::counter!("panicwatch_pushes_failed_total", "channel" => envelope.kind().as_str())
                    .increment(1);
                return;
            }
        };

        let client = match reqwest::blocking::Client::builder().build() {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "Failed to build webhook HTTP client");
                metrics::counter!("panicwatch_pushes_failed_total", "channel" => envelope.kind().as_str())
                    .increment(1);
                return;
            }
        };

        // Only transport errors count as failures; the status is not inspected.
        match client.post(url).header(CONTENT_TYPE, JSON_UTF8).body(body).send() {
            Ok(res) => debug!(status = %res.status(), "Pushed panic report"),
            Err(e) => {
                error!(error = %e, push_url = url, "Post push content failed");
                metrics::counter!("panicwatch_pushes_failed_total", "channel" => envelope.kind().as_str())
                    .increment(1);
            }
        }
    }
}
