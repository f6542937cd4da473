mod bootstrap;
mod error;
mod http;

use anyhow::Result;
use sensor_core::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Sensor server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.loader_config()?;
    tracing::info!(
        "Source: {}, window: {}..={}, thresholds: ({}, {})",
        config.source.display(),
        config.date_window.min(),
        config.date_window.max(),
        config.thresholds.min(),
        config.thresholds.max(),
    );

    let service = bootstrap::build_service(&settings, &config)?;
    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, http::router(service))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received; shutting down");
            }
        })
        .await?;

    Ok(())
}
