use std::path::PathBuf;

use thiserror::Error;

/// The move catalog could not be loaded
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Failed to read move data from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Move data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed move data: {0}")]
    Malformed(String),

    #[error("Move catalog already initialized")]
    AlreadyInitialized,
}

#[derive(Error, Debug)]
pub enum MoveError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error("Unknown move: {0}")]
    UnknownMove(String),

    /// Z-moves have no catalog entry of their own
    #[error("Unsupported move: {0}")]
    UnsupportedMove(String),

    #[error("Invalid record for move {id}: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {field} for move {id}: {value}")]
    InvalidField {
        id: String,
        field: &'static str,
        value: String,
    },
}
