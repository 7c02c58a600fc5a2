//! The request recovery interceptor.
//!
//! [`RecoveryInterceptor`] runs a downstream handler inside a panic-capture
//! region. A normal response passes through untouched. When the handler
//! panics, the interceptor:
//!
//! 1. builds a [`FaultReport`] from the notifier config, the request and the
//!    panic-site stack trace,
//! 2. spawns one detached blocking task per enabled channel to push the
//!    flattened report, and
//! 3. answers the caller with a fixed JSON 500 without waiting for any push.
//!
//! Request bodies are buffered before the handler runs so they can appear in
//! the report. See [`body`] for the limits.

pub mod body;
pub mod report;
pub mod stack;

pub use body::DEFAULT_BODY_CAPTURE_LIMIT;
pub use report::{FaultReport, RequestLine, TIME_FORMAT};

use crate::notification::webhook::{HttpWebhookPusher, WebhookPusher};
use crate::notification::Envelope;
use crate::notifier::NotifierConfig;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chrono::Local;
use futures::FutureExt;
use serde_json::json;
use stack::Armed;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};

/// Catches panics raised by downstream handlers and reports them.
pub struct RecoveryInterceptor {
    config: Arc<NotifierConfig>,
    pusher: Arc<dyn WebhookPusher>,
    body_capture_limit: usize,
}

impl fmt::Debug for RecoveryInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryInterceptor")
            .field("config", &self.config)
            .field("body_capture_limit", &self.body_capture_limit)
            .finish()
    }
}

impl RecoveryInterceptor {
    /// Creates an interceptor that pushes over HTTP.
    pub fn new(config: NotifierConfig) -> Self {
        Self::with_pusher(config, Arc::new(HttpWebhookPusher::new()))
    }

    /// Creates an interceptor with a custom pusher.
    ///
    /// Installs the process-wide capturing panic hook on first use.
    pub fn with_pusher(config: NotifierConfig, pusher: Arc<dyn WebhookPusher>) -> Self {
        stack::install_panic_hook();
        Self {
            config: Arc::new(config),
            pusher,
            body_capture_limit: DEFAULT_BODY_CAPTURE_LIMIT,
        }
    }

    /// Sets how many body bytes may be buffered for a report. `0` disables
    /// body capture.
    pub fn with_body_capture_limit(mut self, limit: usize) -> Self {
        self.body_capture_limit = limit;
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Wraps every route of `router` with [`recover`].
    pub fn install<S>(self: Arc<Self>, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self, recover))
    }

    /// Runs `downstream` with `request`, converting a panic into a 500.
    ///
    /// Reports are pushed on the Tokio blocking pool. Outside a Tokio runtime
    /// the 500 is still returned but no push is sent.
    pub async fn intercept<F, Fut>(&self, request: Request, downstream: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        let line = RequestLine::from(&request);
        let (request, body) = body::capture(request, self.body_capture_limit).await;

        let outcome = AssertUnwindSafe(Armed::new(async move { downstream(request).await }))
            .catch_unwind()
            .await;

        match outcome {
            Ok(response) => response,
            Err(payload) => self.handle_fault(line, body, payload),
        }
    }

    fn handle_fault(&self, request: RequestLine, body: String, payload: Box<dyn Any + Send>) -> Response {
        let fault = stack::panic_message(payload.as_ref());
        let stack = stack::take_captured()
            .unwrap_or_else(|| stack::bounded_trace(&Backtrace::force_capture()));

        error!(
            method = %request.method,
            path = %request.path,
            panic = %fault,
            "Recovered from panic while handling request"
        );
        metrics::counter!("panicwatch_faults_captured_total").increment(1);

        let report = FaultReport {
            env: self.config.env().to_string(),
            host: self.config.host_name().to_string(),
            timestamp: Local::now().format(TIME_FORMAT).to_string(),
            request,
            body,
            fault,
            stack,
        };
        self.notify(&report.flatten());

        server_error(report.fault)
    }

    /// Spawns one detached push per enabled channel.
    fn notify(&self, content: &str) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "No Tokio runtime, dropping panic report pushes");
                return;
            }
        };
        for (kind, url) in self.config.enabled_channels() {
            let envelope = Envelope::text(kind, content);
            let url = url.to_string();
            let pusher = Arc::clone(&self.pusher);
            debug!(channel = %kind, "Spawning panic report push");
            // Never joined: the response does not wait on delivery.
            let _ = runtime.spawn_blocking(move || pusher.push(&envelope, &url));
        }
    }
}

/// Axum middleware entry point, for use with
/// [`axum::middleware::from_fn_with_state`].
pub async fn recover(
    State(interceptor): State<Arc<RecoveryInterceptor>>,
    request: Request,
    next: Next,
) -> Response {
    interceptor.intercept(request, |request| next.run(request)).await
}

/// The fixed response sent for every captured panic.
pub fn server_error(trace: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code": 500,
            "msg": "Server Error",
            "data": null,
            "trace": trace,
        })),
    )
        .into_response()
}
