//! panicwatch - demo server for the panic recovery interceptor
//!
//! Serves a handful of routes (some of which panic on purpose) with the
//! recovery interceptor installed, so the webhook notifications can be
//! observed against real endpoints.

use anyhow::Result;
use clap::Parser;
use panicwatch::{
    cli::Cli,
    config::Settings,
    server::{self, DemoServer},
    ConfigError, NotifierConfig, RecoveryInterceptor,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli).unwrap_or_else(|err| {
        // Logging is not configured yet; fall back to the defaults.
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("panicwatch starting up...");

    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", settings.log_level);
    info!("Listen Address: {}", settings.listen_addr);
    info!("Robot Enabled: {}", settings.robot.enabled);
    info!("Environment: {}", settings.robot.env);
    info!("Body Capture Limit: {} bytes", settings.robot.body_capture_limit);
    info!(
        "WeCom Channel: {}",
        if settings.robot.wecom.enabled { "Enabled" } else { "Disabled" }
    );
    info!(
        "Feishu Channel: {}",
        if settings.robot.feishu.enabled { "Enabled" } else { "Disabled" }
    );
    info!("-------------------------------------------------------");

    let interceptor = match NotifierConfig::new(settings.notifier_options()) {
        Ok(config) => {
            info!("Reporting panics from host {}", config.host_name());
            Some(Arc::new(
                RecoveryInterceptor::new(config)
                    .with_body_capture_limit(settings.robot.body_capture_limit),
            ))
        }
        Err(ConfigError::Disabled) => {
            warn!("Panic robot disabled; serving without the recovery interceptor.");
            None
        }
        Err(e) => {
            error!("Invalid panic robot configuration: {}", e);
            return Err(e.into());
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let listener = TcpListener::bind(settings.listen_addr).await?;
    let server_task = tokio::spawn(DemoServer::new(listener, server::router(interceptor), shutdown_rx).run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    shutdown_tx.send(()).ok();

    if let Err(e) = server_task.await {
        error!("Server task panicked: {:?}", e);
    }

    info!("All tasks shut down. Exiting.");
    Ok(())
}
