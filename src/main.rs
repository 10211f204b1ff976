//! torscrape - HTTP API for torrent site search and trending lists

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use torscrape::api::{create_router, AppState};
use torscrape::config::{load_dotenv, Settings};
use torscrape::log::init_log;
use torscrape::scrapers::{create_client, HttpFetcher, SiteCatalog};
use torscrape::Orchestrator;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let env_file = load_dotenv();
    let settings = Settings::from_env().context("invalid configuration")?;

    if let Some(path) = init_log(settings.log_to_file) {
        info!("Logging to {}", path.display());
    }
    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let client = create_client(settings.fetch_timeout).context("failed to build HTTP client")?;
    let catalog = SiteCatalog::new(&settings.sites);
    info!("Sites: {}", catalog.keys().join(", "));

    let orchestrator = Orchestrator::new(catalog, Arc::new(HttpFetcher::new(client)))
        .with_concurrency(settings.concurrency);
    let state = Arc::new(AppState::new(orchestrator, settings.count_torrents));
    let app = create_router(state);

    let addr = settings.addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server running on port {}\nOpen http://localhost:{}", settings.port, settings.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
