//! Catalog HTTP server
//!
//! REST API over the category services in `catalog-core`.
//!
//! # Architecture
//!
//! The server is organized into endpoint modules merged into one router:
//! - `category_endpoints`: CRUD, tree, search and image upload
//! - `upload_endpoints`: bulk import from CSV/spreadsheet files
//!
//! Category images written by the local blob store are served as static
//! files under the configured media route.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin catalog-server
//! CATALOG_PORT=8080 CATALOG_DATA_DIR=/srv/catalog cargo run --bin catalog-server
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use catalog_core::db::JsonFileStore;
use catalog_core::media::LocalBlobStore;
use catalog_core::CategoryService;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
mod category_endpoints;
mod extract;
mod http_error;
mod upload_endpoints;

pub use config::ServerConfig;
pub use http_error::HttpError;

/// Multipart framing overhead allowed on top of the file size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CategoryService>,
    /// Where uploaded import files are staged until the import finishes
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(service: Arc<CategoryService>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.service.config().max_upload_bytes
    }
}

/// Open the JSON store and local media directory described by `config`
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let store = JsonFileStore::open(config.store_path())
        .await
        .with_context(|| format!("Failed to open store at {}", config.store_path().display()))?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;
    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.media_dir.display()))?;

    let blobs = LocalBlobStore::new(&config.media_dir, &config.media_base_url);
    let service = CategoryService::new(Arc::new(store), Arc::new(blobs), config.catalog.clone());

    Ok(AppState::new(Arc::new(service), &config.upload_dir))
}

/// Create the API router with all endpoint modules
///
/// # Errors
///
/// Fails if `cors_origin` is not a valid origin header value.
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let body_limit = state.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    Ok(Router::new()
        .merge(category_endpoints::routes(state.clone()))
        .merge(upload_endpoints::routes(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(cors_origin)?)
        .layer(TraceLayer::new_for_http()))
}

/// Create CORS layer
///
/// Allows the common local frontend dev ports unless a single origin is
/// configured through `CORS_ALLOW_ORIGIN`.
fn cors_layer(custom_origin: Option<&str>) -> Result<CorsLayer> {
    let default_origins = [
        "http://localhost:3000", // React dev server
        "http://localhost:5173", // Vite default
    ];

    let origins: Vec<HeaderValue> = match custom_origin {
        Some(origin) => vec![origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS_ALLOW_ORIGIN '{}'", origin))?],
        None => default_origins
            .into_iter()
            .map(HeaderValue::from_static)
            .collect(),
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false))
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns error if the store can't be opened or the server fails to bind.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let state = build_state(&config).await?;

    let mut app = create_router(state, config.cors_origin.as_deref())?;
    if let Some(route) = config.media_route() {
        app = app.nest_service(route, ServeDir::new(&config.media_dir));
    }

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Catalog server listening on http://{}", addr);
    tracing::info!("Store: {}", config.store_path().display());
    tracing::info!(
        "Media: {} -> {}",
        config.media_dir.display(),
        config.media_base_url
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
