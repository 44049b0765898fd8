//! NaviLead HTTP API
//!
//! JSON endpoints over the navilead library: quote and billing pricing,
//! offer template storage and rendering, dashboard activity feeds and email
//! previews.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    response::Json,
    routing::get,
};
use navilead::Storage;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;

use config::ServerConfig;
use error::Result;

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(storage: impl Storage, config: ServerConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            config,
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API routes
        .nest("/api", api_routes())
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pricing", routes::pricing::router())
        .nest("/templates", routes::templates::router())
        .nest("/activities", routes::activities::router())
        .nest("/emails", routes::emails::router())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> Result<Json<Value>> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "navilead-server",
        "version": env!("CARGO_PKG_VERSION"),
        "library": navilead::version(),
        "timestamp": time::OffsetDateTime::now_utc().unix_timestamp()
    })))
}
