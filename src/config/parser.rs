use std::path::Path;
use crate::errors::FinderError;
use super::types::FinderConfig;
use tracing::{debug, warn};

/// Largest config file accepted.
const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Parse and validate a YAML config file. The file must exist.
pub async fn parse_config(path: &Path) -> Result<FinderConfig, FinderError> {
    if !path.exists() {
        return Err(FinderError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(FinderError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    validate_conflicts(&config)?;
    Ok(config)
}

/// Like `parse_config`, but a missing file yields the defaults.
pub async fn load_config(path: &Path) -> Result<FinderConfig, FinderError> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(FinderConfig::default());
    }
    parse_config(path).await
}

fn parse_config_str(content: &str) -> Result<FinderConfig, FinderError> {
    // An empty document parses as null; treat it as "all defaults".
    if content.trim().is_empty() {
        return Ok(FinderConfig::default());
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(FinderConfig::default());
    }
    Ok(serde_yaml::from_value(yaml)?)
}

/// Detect settings that cannot work together.
fn validate_conflicts(config: &FinderConfig) -> Result<(), FinderError> {
    if config.workers == Some(0) {
        return Err(FinderError::Config("workers must be at least 1".into()));
    }

    if config.base_directory == config.output_directory {
        warn!(
            path = %config.base_directory.display(),
            "Output directory is the base directory; exports will land among manager folders"
        );
    }

    Ok(())
}
