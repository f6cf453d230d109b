use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read base directory '{}': {source}", path.display())]
    BaseDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk error at '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan task failed for manager '{manager}', client '{client}': {message}")]
    TaskFailed {
        manager: String,
        client: String,
        message: String,
    },

    #[error("Export failed for client '{client}': {message}")]
    Export { client: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid statement type pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FinderError {
    /// Wrap an export-stage error with the client it belongs to.
    pub fn export(client: &str, err: impl std::fmt::Display) -> Self {
        FinderError::Export {
            client: client.to_string(),
            message: err.to_string(),
        }
    }
}
