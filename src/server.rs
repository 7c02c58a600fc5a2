//! # Demo Server
//!
//! An `axum` server with a few routes that succeed or panic on demand, used
//! to exercise the recovery interceptor end to end. When an interceptor is
//! supplied every route is wrapped by it; without one a panicking handler
//! simply drops the connection, as axum does by default.
//!
//! The server shuts down gracefully when the `watch` channel it was given
//! changes.

use crate::recovery::RecoveryInterceptor;
use axum::extract::Query;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, trace};

#[derive(Debug, Deserialize)]
struct EchoParams {
    #[serde(default)]
    panic: bool,
}

/// Builds the demo routes, wrapped by `interceptor` when given.
pub fn router(interceptor: Option<Arc<RecoveryInterceptor>>) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/panic", get(panic_handler))
        .route("/echo", post(echo_handler));

    match interceptor {
        Some(interceptor) => interceptor.install(router),
        None => router,
    }
}

async fn panic_handler() -> &'static str {
    panic!("panic route called")
}

async fn echo_handler(Query(params): Query<EchoParams>, body: String) -> String {
    if params.panic {
        panic!("echo asked to panic after reading {} bytes", body.len());
    }
    body
}

/// The demo server.
pub struct DemoServer {
    listener: TcpListener,
    router: Router,
    shutdown_rx: watch::Receiver<()>,
}

impl DemoServer {
    /// Creates a new `DemoServer` but does not spawn it.
    ///
    /// # Arguments
    ///
    /// * `listener` - A `TcpListener` that has already been bound to an address.
    /// * `router` - The routes to serve, usually from [`router`].
    /// * `shutdown_rx` - A watch channel receiver for graceful shutdown.
    pub fn new(listener: TcpListener, router: Router, shutdown_rx: watch::Receiver<()>) -> Self {
        Self {
            listener,
            router,
            shutdown_rx,
        }
    }

    /// Runs the server until a shutdown signal is received.
    pub async fn run(self) {
        let mut shutdown_rx = self.shutdown_rx;
        if let Ok(addr) = self.listener.local_addr() {
            info!("Demo server listening on {}", addr);
        }

        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
                trace!("Demo server received shutdown signal.");
            })
            .await;

        if let Err(e) = result {
            error!("Demo server error: {}", e);
        }
        trace!("Demo server task finished.");
    }
}
