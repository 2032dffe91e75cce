// src/error.rs
use thiserror::Error;

// --- Error Handling ---
//
// Only the ingestion boundary and the CLI surface produce errors. Time parsing
// and classification are total and never appear here.

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV decoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("{0}")]
    EmptyDataset(String),
    #[error("Unsupported file type '{0}'; expected a .csv export")]
    UnsupportedFormat(String),
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
    #[error("Could not parse evaluation instant '{0}'")]
    InvalidNow(String),
    #[error("Row {index} out of range (dataset has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}

pub type AppResult<T> = Result<T, AppError>;
