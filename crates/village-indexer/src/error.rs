use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("subgraph returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("subgraph query failed: {0}")]
    GraphQl(String),

    #[error("subgraph response had no data")]
    MissingData,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid character data: {0}")]
    Json(#[from] serde_json::Error),
}
