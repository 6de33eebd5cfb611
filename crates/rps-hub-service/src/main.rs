//! RPS Hub Service
//!
//! Custodial Rock-Paper-Scissors wagering over HTTP.

use rps_engine::HubConfig;
use rps_hub_service::{app, AppState, ServiceConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;
    let hub_config = HubConfig::new(config.owner, config.session_expiration_secs)?;

    // One engine up front so players can start without an admin call
    let state = AppState::with_engine(hub_config)?;
    {
        let hub = state.hub();
        tracing::info!("Hub owner: {}", hub.owner());
        tracing::info!(
            "Session expiration period: {}s",
            hub.session_expiration_period().num_seconds()
        );
        for engine in hub.engine_ids() {
            tracing::info!("Rock-Paper-Scissors engine: {}", engine);
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("RPS hub service starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
