use std::io;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ticket_server::catalog::{Catalog, CatalogClient, CatalogError, MockCatalog};
use ticket_server::clock::SystemClock;
use ticket_server::config::{ConfigError, ServerConfig};
use ticket_server::web::{AppState, create_router};

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set up catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("server error: {0}")]
    Serve(io::Error),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TICKET_SERVER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_catalog(config: &ServerConfig) -> Result<Catalog, CatalogError> {
    if let Some(dir) = &config.mock_dir {
        let mock = MockCatalog::new(dir)?;
        info!(dir = %dir.display(), tickets = mock.ticket_count(), "serving fixture catalog");
        return Ok(Catalog::Fixtures(mock));
    }

    if config.api_token.is_none() {
        warn!("TICKET_API_TOKEN not set, ticket reads are sent without a service token");
    }
    let client = CatalogClient::new(config.catalog_config())?;
    info!(api = %client.base_url(), "using marketplace API");
    Ok(Catalog::Remote(client))
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    let catalog = build_catalog(&config)?;

    let state = AppState::new(catalog, Arc::new(SystemClock), config.tick);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.bind_addr,
            source,
        })?;

    info!("ticket server listening on http://{}", config.bind_addr);
    info!("  GET  /health                              - Health check");
    info!("  GET  /api/countdown?departure=            - Evaluate a departure string");
    info!("  GET  /api/tickets/:id/countdown           - Ticket countdown");
    info!("  GET  /api/tickets/:id/countdown/stream    - Live ticket countdown (SSE)");
    info!("  GET  /api/bookings?email=                 - Bookings with countdowns (rider token)");
    info!("  GET  /api/bookings/:id/countdown/stream   - Live booking countdown (SSE, rider token)");
    info!("  GET  /tickets/:id                         - Ticket detail fragment");
    info!("  GET  /bookings?email=                     - My-bookings fragment (rider token)");

    axum::serve(listener, app).await.map_err(StartupError::Serve)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
