//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the demo server using
//! the `clap` crate. They are merged on top of the configuration file and
//! environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// An HTTP server whose panicking handlers are reported to chat webhooks.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080.
    #[arg(long, value_name = "ADDR")]
    pub listen_addr: Option<String>,

    /// Environment label included in panic reports.
    #[arg(long, value_name = "LABEL")]
    pub env: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(addr) = &self.listen_addr {
            dict.insert("listen_addr".into(), Value::from(addr.clone()));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(env) = &self.env {
            let mut robot = Dict::new();
            robot.insert("env".into(), Value::from(env.clone()));
            dict.insert("robot".into(), Value::from(robot));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
