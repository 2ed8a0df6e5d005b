//! TM Publisher Service (sqd)
//!
//! The host-facing service of the TM publisher. It provides:
//!
//! - **Trigger intake**: recognizes TA-style trigger requests and stages
//!   the synthesized build parameters for the build they start
//! - **Build completion**: flattens the build's test results, adapts them
//!   to the generic or TA-compatible shape and posts them to the selected
//!   TM servers
//! - **Test-list resource**: serves the known-test listing of the last
//!   wrapped build of each job
//!
//! Configuration (registered servers and job entries) is read once at
//! startup from a TOML file.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sq_config::{SqServerRegistry, SqUserConfig};
use sq_publisher::SqPublisher;

use crate::prelude::*;
use crate::state::SqdState;

mod api;
mod error;
mod prelude;
mod state;

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Main entry point for the TM Publisher Service.
///
/// Initializes logging, loads the configuration and serves the API until a
/// shutdown signal is received or the server fails.
///
/// # Examples
///
/// The service is typically started with:
/// ```bash
/// export SQD_CONFIG=/etc/sqd/sqd.toml
/// export SQD_ADDR=127.0.0.1:3000
/// sqd
/// ```
///
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = env_or("SQD_CONFIG", "sqd.toml");
    let addr = env_or("SQD_ADDR", "127.0.0.1:3000");
    let public_url = env_or("SQD_PUBLIC_URL", &format!("http://{addr}"));

    let config = SqUserConfig::from_file(Path::new(&config_path))?;
    let registry = SqServerRegistry::new(config.servers.clone())?;
    tracing::info!(
        "loaded {} server(s) and {} job(s) from {config_path}",
        registry.servers().len(),
        config.jobs.len()
    );

    let state = SqdState::new(config, SqPublisher::new(registry), public_url);
    let api_handle = api::setup_api(state, &addr).await?;

    tokio::select! {
        result = api_handle => {
            tracing::error!("API server stopped: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
