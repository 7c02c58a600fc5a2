//! panicwatch - panic recovery middleware with chat-webhook alerts
//!
//! This library catches panics raised by `axum` request handlers, answers
//! the caller with a fixed JSON 500, and pushes a diagnostic report
//! (environment, host, request, stack trace) to WeCom and Feishu robots.

pub mod cli;
pub mod config;
pub mod error;
pub mod notification;
pub mod notifier;
pub mod recovery;
pub mod server;
pub mod utils;

// Re-export the main types for convenience
pub use error::ConfigError;
pub use notification::webhook::{HttpWebhookPusher, WebhookPusher};
pub use notification::Envelope;
pub use notifier::{ChannelConfig, ChannelKind, NotifierConfig, NotifierConfigBuilder, NotifierOption};
pub use recovery::{recover, FaultReport, RecoveryInterceptor};
