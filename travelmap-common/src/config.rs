//! Configuration loading for the travelmap server
//!
//! Values resolve in priority order: command-line argument, environment
//! variable, TOML config file, compiled default. The Google API key has
//! no default; its absence is logged once and all geocode/photo calls
//! fail closed.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5001;
/// Default SQLite database path (relative to working directory)
pub const DEFAULT_DATABASE_PATH: &str = "travelmap.db";
/// Default directory for uploaded images
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Raw TOML configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub uploads_dir: Option<PathBuf>,
    pub google_api_key: Option<String>,
}

impl TomlConfig {
    /// Load from a TOML file; a missing file yields the empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Command-line overrides (highest priority)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub uploads_dir: Option<PathBuf>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub uploads_dir: PathBuf,
    /// Google Maps/Places API credential; `None` fails geocoding closed
    pub google_api_key: Option<String>,
}

impl ServerConfig {
    /// Resolve configuration from CLI, environment, and TOML tiers
    pub fn resolve(cli: CliOverrides, toml_config: &TomlConfig) -> Self {
        let port = cli
            .port
            .or_else(|| env_parsed("TRAVELMAP_PORT"))
            .or(toml_config.port)
            .unwrap_or(DEFAULT_PORT);

        let database_path = cli
            .database_path
            .or_else(|| std::env::var("TRAVELMAP_DATABASE").ok().map(PathBuf::from))
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let uploads_dir = cli
            .uploads_dir
            .or_else(|| std::env::var("TRAVELMAP_UPLOADS_DIR").ok().map(PathBuf::from))
            .or_else(|| toml_config.uploads_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR));

        let google_api_key = std::env::var("TRAVELMAP_GOOGLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| toml_config.google_api_key.clone());

        match &google_api_key {
            Some(_) => info!("Google API key configured"),
            None => warn!(
                "TRAVELMAP_GOOGLE_API_KEY is not set; geocoding and photo \
                 lookups will fail closed"
            ),
        }

        Self {
            port,
            database_path,
            uploads_dir,
            google_api_key,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
