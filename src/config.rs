use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::catalog::CardCatalog;
use crate::db;
use crate::error::Result;

/// Origins allowed to call the API when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "chrome-extension://aaeaknjonfeaofipbnkfenbnfndkhmco",
    "http://127.0.0.1:8000",
    "http://localhost:8000",
];

/// Where the card catalog comes from.
#[derive(Debug, Clone, Default, Args)]
pub struct CatalogArgs {
    /// JSON file with card definitions
    #[arg(long, env = "SPENDSMART_CATALOG", conflicts_with = "db", global = true)]
    pub catalog: Option<PathBuf>,
    /// SQLite card store
    #[arg(long, env = "SPENDSMART_DB", global = true)]
    pub db: Option<PathBuf>,
}

impl CatalogArgs {
    /// Loads the catalog once: JSON file, SQLite store, or the bundled cards.
    pub fn load(&self) -> Result<CardCatalog> {
        let catalog = match (&self.catalog, &self.db) {
            (Some(path), _) => {
                info!(path = %path.display(), "Loading card catalog from JSON");
                CardCatalog::load_json(path)?
            }
            (None, Some(path)) => {
                info!(path = %path.display(), "Loading card catalog from SQLite");
                db::load_catalog(&db::open_db(path)?)?
            }
            (None, None) => CardCatalog::bundled()?,
        };
        info!(cards = catalog.len(), "Card catalog loaded");
        Ok(catalog)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "SPENDSMART_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,
    #[arg(long, env = "SPENDSMART_PORT", default_value_t = 8000)]
    pub port: u16,
    /// Comma-separated CORS origins
    #[arg(long = "allowed-origin", env = "SPENDSMART_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn origins(&self) -> Vec<String> {
        if self.allowed_origins.is_empty() {
            DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
        } else {
            self.allowed_origins.clone()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            allowed_origins: Vec::new(),
        }
    }
}
