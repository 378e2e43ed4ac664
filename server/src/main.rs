use std::net::SocketAddr;

use anyhow::{Context, Result};
use cobj_server::{config::Config, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Loaded before logging so RUST_LOG and LOG_FORMAT may come from .env.
    let dotenv = dotenvy::dotenv();
    init_logging();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "could not read .env file"),
    }

    let config = Config::from_env().context("invalid configuration")?;
    if !config.has_api_key() {
        warn!("HUBSPOT_API_KEY is not set; every CRM request will fail authentication");
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        object_type = %config.object_type,
        "server is running on http://localhost:{}",
        config.port
    );

    let state = AppState::new(config).context("failed to build CRM client")?;
    cobj_server::run(listener, state).await?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
