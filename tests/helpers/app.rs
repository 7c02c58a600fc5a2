#![allow(dead_code)]
//! Test helpers for running the demo server.

use anyhow::Result;
use panicwatch::{server, ChannelKind, NotifierConfig, RecoveryInterceptor};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, sync::watch, task::JoinHandle, time::timeout};

/// A running demo server bound to an ephemeral local port.
#[derive(Debug)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestApp {
    /// Starts the demo routes, wrapped by `interceptor` when given.
    pub async fn spawn(interceptor: Option<Arc<RecoveryInterceptor>>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = tokio::spawn(
            server::DemoServer::new(listener, server::router(interceptor), shutdown_rx).run(),
        );

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            shutdown_tx,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shuts down the server and waits for it to terminate.
    pub async fn shutdown(self, timeout_duration: Duration) -> Result<()> {
        self.shutdown_tx.send(()).ok();
        match timeout(timeout_duration, self.handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(anyhow::anyhow!("Server failed to shut down within the timeout")),
        }
    }
}

/// Builds a notifier config with the given channels enabled.
pub fn notifier_config(wecom_url: Option<&str>, feishu_url: Option<&str>) -> NotifierConfig {
    NotifierConfig::builder()
        .enable(true)
        .env("integration")
        .host_name("test-host")
        .channel_enable(ChannelKind::WeCom, wecom_url.is_some())
        .channel_push_url(ChannelKind::WeCom, wecom_url.unwrap_or_default())
        .channel_enable(ChannelKind::Feishu, feishu_url.is_some())
        .channel_push_url(ChannelKind::Feishu, feishu_url.unwrap_or_default())
        .build()
        .expect("test notifier config should be valid")
}
