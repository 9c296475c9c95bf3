//! guildwarden - guild guardrail agent.
//!
//! Speaks newline-delimited JSON with a gateway bridge on stdin/stdout. Logs
//! go to stderr.

use guildwarden::platform::bridge::{Bridge, spawn_writer};
use guildwarden::telemetry::spans;
use guildwarden::{Config, Dispatcher, Warden};
use std::sync::Arc;
use tracing::{Instrument, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        whitelist = config.policy.whitelist.len(),
        ignored_channels = config.policy.ignored_channel_ids.len(),
        ignored_roles = config.policy.ignored_role_ids.len(),
        restore_scope = ?config.policy.restore_scope,
        "Starting guildwarden"
    );

    let metrics_port = config.server.metrics_port.unwrap_or(0);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        guildwarden::metrics::init();
        tokio::spawn(guildwarden::http::run_http_server(metrics_port));
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    let (bridge, outbound) = Bridge::new(&config.bridge);
    let writer = spawn_writer(outbound, tokio::io::stdout());

    let warden = Arc::new(Warden::new(Arc::clone(&bridge), &config));
    let dispatcher = Dispatcher::new(warden);

    {
        let bridge = Arc::clone(&bridge);
        let token = config.bot.token.clone();
        tokio::spawn(async move {
            match bridge.identify(&token).await {
                Ok(()) => info!("Identified with gateway bridge"),
                Err(e) => error!(error = %e, "Gateway bridge refused identify"),
            }
        });
    }

    tokio::select! {
        result = bridge.pump(tokio::io::stdin(), &dispatcher).instrument(spans::bridge()) => {
            match result {
                Ok(()) => info!("Gateway bridge closed its stream"),
                Err(e) => {
                    error!(error = %e, "Gateway bridge stream failed");
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    if bridge.pending() > 0 {
        warn!(pending = bridge.pending(), "Exiting with bridge commands awaiting acknowledgement");
    }
    writer.abort();
    Ok(())
}
