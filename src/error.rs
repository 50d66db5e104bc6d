// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Discord error: {0}")]
    Discord(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("RCON error: {0}")]
    Rcon(#[from] rcon::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}
