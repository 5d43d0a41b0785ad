//! Catalog HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 5000, data in ~/.catalog)
//! cargo run --bin catalog-server
//!
//! # Custom port and data directory
//! CATALOG_PORT=8080 CATALOG_DATA_DIR=/srv/catalog cargo run --bin catalog-server
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_*`: Server settings, see `catalog_server::config`
//! - `CORS_ALLOW_ORIGIN`: Allowed browser origin
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "catalog_core=trace")

use catalog_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env()?;
    tracing::info!("Port: {}", config.port);
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!(
        "Unique category names: {}",
        config.catalog.enforce_unique_names
    );

    start_server(config).await
}
