//! Error types for building the recovery interceptor.

use crate::notifier::ChannelKind;

/// Errors raised while constructing a [`NotifierConfig`](crate::notifier::NotifierConfig).
///
/// These only ever surface at construction time; a fault captured while
/// serving a request is never reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("panic robot is disabled")]
    Disabled,

    #[error("{0} push url can not be empty")]
    MissingPushUrl(ChannelKind),

    #[error("failed to resolve local host name")]
    HostResolution,
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
