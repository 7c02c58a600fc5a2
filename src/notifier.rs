//! Notifier configuration for the recovery interceptor.
//!
//! A [`NotifierConfig`] is assembled from an ordered list of
//! [`NotifierOption`]s, either passed directly to [`NotifierConfig::new`] or
//! accumulated through the chained [`NotifierConfigBuilder`]. Options are
//! applied in order and the last write to a field wins. Once built, the
//! config is immutable and safe to share across tasks.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// The chat-webhook channels a captured fault can be pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// WeCom (WeChat Work) group robot.
    WeCom,
    /// Feishu / Lark custom bot.
    Feishu,
}

impl ChannelKind {
    /// Every channel kind, in notification order.
    pub const ALL: [ChannelKind; 2] = [ChannelKind::WeCom, ChannelKind::Feishu];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::WeCom => "wecom",
            ChannelKind::Feishu => "feishu",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-channel settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelConfig {
    pub enabled: bool,
    pub push_url: String,
}

/// A single configuration option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierOption {
    /// Overall switch. Construction fails unless this ends up `true`.
    Enable(bool),
    /// Free-text environment label, e.g. `production`.
    Env(String),
    ChannelEnable(ChannelKind, bool),
    ChannelPushUrl(ChannelKind, String),
    /// Use this host name instead of resolving the local one.
    HostName(String),
}

#[derive(Debug, Default)]
struct NotifierOptions {
    enabled: bool,
    env: String,
    host_name: Option<String>,
    channels: BTreeMap<ChannelKind, ChannelConfig>,
}

impl NotifierOptions {
    fn apply(&mut self, option: NotifierOption) {
        match option {
            NotifierOption::Enable(enabled) => self.enabled = enabled,
            NotifierOption::Env(env) => self.env = env,
            NotifierOption::ChannelEnable(kind, enabled) => {
                self.channels.entry(kind).or_default().enabled = enabled;
            }
            NotifierOption::ChannelPushUrl(kind, url) => {
                self.channels.entry(kind).or_default().push_url = url;
            }
            NotifierOption::HostName(host) => self.host_name = Some(host),
        }
    }
}

/// Immutable notifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    env: String,
    host_name: String,
    channels: BTreeMap<ChannelKind, ChannelConfig>,
}

impl NotifierConfig {
    /// Builds a config from `options`, resolving the local host name unless
    /// a [`NotifierOption::HostName`] override is given.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = NotifierOption>,
    {
        Self::from_options(options, resolve_host_name)
    }

    pub fn builder() -> NotifierConfigBuilder {
        NotifierConfigBuilder::default()
    }

    pub(crate) fn from_options<I, R>(options: I, resolve_host: R) -> Result<Self>
    where
        I: IntoIterator<Item = NotifierOption>,
        R: FnOnce() -> Option<String>,
    {
        let mut opts = NotifierOptions::default();
        for option in options {
            opts.apply(option);
        }

        if !opts.enabled {
            return Err(ConfigError::Disabled);
        }

        for kind in ChannelKind::ALL {
            let channel = opts.channels.entry(kind).or_default();
            if channel.enabled && channel.push_url.is_empty() {
                return Err(ConfigError::MissingPushUrl(kind));
            }
        }

        let host_name = match opts.host_name {
            Some(host) => Some(host),
            None => resolve_host(),
        }
        .filter(|host| !host.is_empty())
        .ok_or(ConfigError::HostResolution)?;

        debug!(env = %opts.env, host = %host_name, "Built notifier config");

        Ok(Self {
            env: opts.env,
            host_name,
            channels: opts.channels,
        })
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn channel(&self, kind: ChannelKind) -> &ChannelConfig {
        // Every kind is inserted during construction.
        &self.channels[&kind]
    }

    /// Enabled channels with their push URLs, in [`ChannelKind::ALL`] order.
    pub fn enabled_channels(&self) -> impl Iterator<Item = (ChannelKind, &str)> + '_ {
        self.channels
            .iter()
            .filter(|(_, channel)| channel.enabled)
            .map(|(kind, channel)| (*kind, channel.push_url.as_str()))
    }
}

/// Chained builder over [`NotifierOption`]s.
#[derive(Debug, Default, Clone)]
pub struct NotifierConfigBuilder {
    options: Vec<NotifierOption>,
}

impl NotifierConfigBuilder {
    pub fn enable(mut self, enabled: bool) -> Self {
        self.options.push(NotifierOption::Enable(enabled));
        self
    }

    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.options.push(NotifierOption::Env(env.into()));
        self
    }

    pub fn channel_enable(mut self, kind: ChannelKind, enabled: bool) -> Self {
        self.options.push(NotifierOption::ChannelEnable(kind, enabled));
        self
    }

    pub fn channel_push_url(mut self, kind: ChannelKind, url: impl Into<String>) -> Self {
        self.options.push(NotifierOption::ChannelPushUrl(kind, url.into()));
        self
    }

    pub fn host_name(mut self, host: impl Into<String>) -> Self {
        self.options.push(NotifierOption::HostName(host.into()));
        self
    }

    /// Appends arbitrary options, e.g. those produced from [`Settings`](crate::config::Settings).
    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = NotifierOption>,
    {
        self.options.extend(options);
        self
    }

    pub fn build(self) -> Result<NotifierConfig> {
        NotifierConfig::new(self.options)
    }
}

fn resolve_host_name() -> Option<String> {
    sysinfo::System::host_name()
}
