use std::sync::Arc;

use anyhow::Context;
use hotpot_infra::AppConfig;
use hotpot_observability::LogConfig;
use hotpot_servers::{HttpServer, ServerManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    hotpot_observability::init(&LogConfig::new(config.log_level));

    let app = hotpot_api::app::build_app();

    let mut manager = ServerManager::new();
    manager.add_server(Arc::new(HttpServer::new("http", config.http_addr(), app)))?;

    let started = manager.start_all().await?;
    if !started.is_empty() && started.succeeded() == 0 {
        manager.stop_all().await?;
        anyhow::bail!("no server could be started");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");

    manager.stop_all().await?;
    Ok(())
}
