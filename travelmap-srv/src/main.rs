//! travelmap-srv - Team travel map backend
//!
//! Serves the travel-record API, the place photo search/proxy, and the
//! uploaded image store.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use travelmap_common::config::{CliOverrides, ServerConfig, TomlConfig};
use travelmap_srv::services::{GeocodingClient, PlacePhotoClient};
use travelmap_srv::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "travelmap-srv", version, about = "Team travel map backend")]
struct Args {
    /// HTTP port (overrides TRAVELMAP_PORT and the config file)
    #[arg(long)]
    port: Option<u16>,

    /// TOML config file path
    #[arg(long, default_value = "travelmap.toml")]
    config: PathBuf,

    /// SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory for uploaded images
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting travelmap-srv v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let toml_config = TomlConfig::load(&args.config)?;
    let config = ServerConfig::resolve(
        CliOverrides {
            port: args.port,
            database_path: args.database,
            uploads_dir: args.uploads_dir,
        },
        &toml_config,
    );

    std::fs::create_dir_all(&config.uploads_dir)?;
    info!("Uploads directory: {}", config.uploads_dir.display());

    let pool = travelmap_srv::db::init_database(&config.database_path).await?;
    info!("Database: {}", config.database_path.display());

    let geocoder = Arc::new(GeocodingClient::new(config.google_api_key.clone()));
    let photos = Arc::new(PlacePhotoClient::new(config.google_api_key.clone()));

    let state = AppState::new(pool, geocoder, photos, config.uploads_dir.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("travelmap-srv listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
