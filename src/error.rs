use thiserror::Error;

/// Failures from the catalog loaders and store. Reward evaluation itself
/// has no failure modes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid card catalog: {0}")]
    InvalidCatalog(String),
}

pub type Result<T> = std::result::Result<T, Error>;
