//! NaviLead HTTP API server

use std::net::SocketAddr;

use navilead::FileStorage;
use navilead_server::{AppState, config::ServerConfig, create_router, error::Result, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let _log_guards = logging::init(&config.log_dir)?;

    info!("Starting NaviLead Server on {}:{}", config.host, config.port);
    info!(
        "Templates in {}, default VAT {}%, default currency {}",
        config.template_dir.display(),
        config.default_vat_percent,
        config.default_currency
    );

    let storage = FileStorage::new(&config.template_dir);
    let state = AppState::new(storage, config.clone());
    let app = create_router(state);

    let host: std::net::IpAddr = config.host.parse().map_err(|_| {
        navilead_server::error::ApiError::Config(format!("Invalid HOST value: {}", config.host))
    })?;
    let addr = SocketAddr::from((host, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
