//! Superset Embedded
//!
//! Runs a complete embedding session against the headless frame: a
//! simulated host opens the channel, hands over guest tokens and polls the
//! frame's scroll size.

use superset_embedded::host::run_simulation;
use superset_embedded::logging::init_tracing;
use superset_embedded::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Superset embedded page v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(api = %config.api.base_url, channel = %config.embedded.channel_name, "Configuration loaded");

    let href = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("{}/embedded/00000000-0000-0000-0000-000000000000/", config.api.base_url));

    let report = run_simulation(&config, &href)?;

    tracing::info!(
        phase = ?report.phase,
        tokens = report.guest_tokens_sent,
        mounts = report.mounts,
        scroll = ?report.scroll_size,
        "Simulation finished"
    );
    if let Some(error) = &report.undefined_method_error {
        tracing::info!(%error, "Undefined method answered with error");
    }

    Ok(())
}
