use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings read from `config.yaml`. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Directory holding one folder per manager.
    pub base_directory: PathBuf,
    /// Where CSV manifests and ZIP archives are written.
    pub output_directory: PathBuf,
    /// Append-only activity log.
    pub log_file: PathBuf,
    /// Scan worker pool size; host parallelism when unset.
    pub workers: Option<usize>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("YOUR_FILE_PATH_HERE/Client Statements"),
            output_directory: PathBuf::from("YOUR_FILE_PATH_HERE/statement_finder_output"),
            log_file: PathBuf::from("logs/activity.log"),
            workers: None,
        }
    }
}
