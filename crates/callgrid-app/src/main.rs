use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod settings;

/// Environment:
/// - `RUST_LOG`: log filter (`debug` shows every pass and tile update)
/// - `CALLGRID_CONFIG`: path to a JSON grid config
/// - `CALLGRID_MIN_INTERVAL_MS`: overrides the minimum spacing between passes
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = settings::from_env()?;
    info!(
        "callgrid-demo v{} | min interval {} ms | {:?} | one-on-one label {}",
        env!("CARGO_PKG_VERSION"),
        config.min_interval_ms,
        config.orientation,
        if config.hide_local_label_one_on_one { "hidden" } else { "shown" }
    );

    app::run(config).await.map_err(|e| {
        error!("Demo aborted: {:#}", e);
        e
    })
}
