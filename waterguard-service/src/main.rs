use anyhow::Result;
use waterguard_service::{config::AppConfig, dashboard_server, metrics_server, observability};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    dashboard_server::serve(&cfg.http.bind_addr, cfg.http.max_upload_bytes).await?;

    Ok(())
}
