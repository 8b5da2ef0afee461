use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Partition error: {0}")]
    Partition(String),

    #[error("Segmentation error: {0}")]
    Segmentation(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Invalid processor state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
