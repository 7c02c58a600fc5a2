//! Configuration management for panicwatch
//!
//! This module defines the `Settings` struct, which holds everything the
//! demo server and the recovery interceptor need. Settings are layered with
//! `figment`: built-in defaults, then an optional TOML file, then
//! `PANICWATCH_`-prefixed environment variables, then command-line arguments.

use crate::cli::Cli;
use crate::notifier::{ChannelKind, NotifierOption};
use crate::recovery::DEFAULT_BODY_CAPTURE_LIMIT;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// The logging level, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Address the demo server listens on.
    pub listen_addr: SocketAddr,
    /// Recovery interceptor settings.
    pub robot: RobotSettings,
}

/// Settings for the recovery interceptor and its notification channels.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RobotSettings {
    /// Master switch; when false the interceptor is not installed.
    pub enabled: bool,
    /// Environment label included in every report.
    pub env: String,
    /// Overrides the resolved local host name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    /// Maximum number of request body bytes buffered for a report.
    pub body_capture_limit: usize,
    #[serde(default)]
    pub wecom: ChannelSettings,
    #[serde(default)]
    pub feishu: ChannelSettings,
}

/// Settings for one webhook channel.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ChannelSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub push_url: String,
}

impl Settings {
    /// Loads settings from the file named on the command line (if any), the
    /// environment and the command line itself.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(path) = &cli.config_file {
            if !path.exists() {
                anyhow::bail!("Config file not found at specified path: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let settings = figment
            // e.g. PANICWATCH_ROBOT__WECOM__PUSH_URL=https://...
            .merge(Env::prefixed("PANICWATCH_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(settings)
    }

    /// The `robot` table as notifier options.
    pub fn notifier_options(&self) -> Vec<NotifierOption> {
        let robot = &self.robot;
        let mut options = vec![
            NotifierOption::Enable(robot.enabled),
            NotifierOption::Env(robot.env.clone()),
        ];
        if let Some(host) = &robot.host_name {
            options.push(NotifierOption::HostName(host.clone()));
        }
        for (kind, channel) in [
            (ChannelKind::WeCom, &robot.wecom),
            (ChannelKind::Feishu, &robot.feishu),
        ] {
            options.push(NotifierOption::ChannelEnable(kind, channel.enabled));
            options.push(NotifierOption::ChannelPushUrl(kind, channel.push_url.clone()));
        }
        options
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            robot: RobotSettings {
                enabled: false,
                env: "development".to_string(),
                host_name: None,
                body_capture_limit: DEFAULT_BODY_CAPTURE_LIMIT,
                wecom: ChannelSettings::default(),
                feishu: ChannelSettings::default(),
            },
        }
    }
}
