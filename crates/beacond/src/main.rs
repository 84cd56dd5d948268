//! beacond: network-scoped service discovery daemon.

use anyhow::{Context, Result};

use beacon_core::{BeaconConfig, KeyDeriver};
use beacon_services::{sweep_loop, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    let config = BeaconConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        let mut config = BeaconConfig::default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    });
    config.validate().context("refusing to start")?;

    let lifetime = config.registry.lifetime();
    let sweep_interval = config.registry.sweep_interval();
    tracing::info!(
        listen = %config.server.listen,
        trust_forwarded = config.server.trust_forwarded,
        lifetime_secs = lifetime.as_secs(),
        sweep_interval_secs = sweep_interval.as_secs(),
        "beacond starting"
    );
    if config.server.trust_forwarded {
        tracing::warn!("trusting X-Forwarded-For; run this only behind a proxy that sets it");
    }

    // Shared state
    let registry = Registry::new();

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let sweeper_task = tokio::spawn(sweep_loop(registry.clone(), lifetime, sweep_interval));

    let api_task = {
        let state = beacon_api::ApiState {
            registry: registry.clone(),
            keys: KeyDeriver::new(config.server.trust_forwarded),
            lifetime,
            sweep_interval,
        };
        let listen = config.server.listen;
        tokio::spawn(async move { beacon_api::serve(state, listen).await })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    tokio::select! {
        r = tokio::signal::ctrl_c() => match r {
            Ok(()) => tracing::info!("shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "unable to listen for shutdown signal"),
        },
        r = sweeper_task => tracing::error!("sweeper exited: {:?}", r),
        r = api_task => match r {
            Ok(Ok(())) => tracing::error!("API server exited"),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "API server failed");
                return Err(e);
            }
            Err(e) => tracing::error!(error = %e, "API task panicked"),
        },
    }

    tracing::info!(networks = registry.len(), "shutting down");
    Ok(())
}
