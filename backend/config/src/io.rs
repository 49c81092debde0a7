//! Locating and reading the logging config file.

use crate::env::resolve_env_vars;
use crate::schema::LoggingConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "logging.yaml";

/// Explicit config file location.
pub const CONFIG_PATH_VAR: &str = "LINELOG_CONFIG";

/// Resolve the linelog config directory: `<platform config dir>/linelog`.
pub fn config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("linelog"),
        None => PathBuf::from(".").join("linelog"),
    }
}

/// Resolve the config file path.
/// Priority: `LINELOG_CONFIG` env > `<config_dir>/logging.yaml`
pub fn config_file_path() -> PathBuf {
    config_file_path_from(std::env::var(CONFIG_PATH_VAR).ok().as_deref())
}

/// An empty override counts as unset.
fn config_file_path_from(explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => config_dir().join(CONFIG_FILE_NAME),
    }
}

/// On-disk encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse raw text, substituting `${VAR}` references from the process env.
pub fn parse_config(raw: &str, format: ConfigFormat) -> Result<LoggingConfig> {
    let value: Value = match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(raw).context("Failed to parse logging config YAML")?
        }
        ConfigFormat::Json => {
            serde_json::from_str(raw).context("Failed to parse logging config JSON")?
        }
    };

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in logging config")?;

    serde_json::from_value(value).context("Failed to deserialize logging config")
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist, which leaves a
/// registry exactly as it was.
pub async fn load_config(path: &Path) -> Result<LoggingConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Logging config does not exist; using defaults");
        return Ok(LoggingConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read logging config: {}", path.display()))?;

    let config = parse_config(&raw, ConfigFormat::for_path(path))
        .with_context(|| format!("Invalid logging config at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded logging config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SinkTarget;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::for_path(Path::new("a/b.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::for_path(Path::new("a/b.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::for_path(Path::new("a/b.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::for_path(Path::new("a/b")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_config_dir_is_namespaced() {
        assert!(config_dir().ends_with("linelog"));
    }

    #[test]
    fn test_config_path_override() {
        assert_eq!(
            config_file_path_from(Some("/etc/app/log.json")),
            PathBuf::from("/etc/app/log.json")
        );
        assert_eq!(config_file_path_from(Some("")), config_dir().join("logging.yaml"));
        assert_eq!(config_file_path_from(None), config_dir().join("logging.yaml"));
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(config, LoggingConfig::default());
    }

    #[tokio::test]
    async fn test_loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.yaml");
        std::fs::write(
            &path,
            "flip_args: true\nstreams:\n  - level: info\n    target: stdout\n",
        )
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.flip_args, Some(true));
        assert_eq!(config.streams.unwrap()[0].target, SinkTarget::Stdout);
    }

    #[tokio::test]
    async fn test_loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.json");
        std::fs::write(&path, r#"{"fast_time": true, "streams": []}"#).unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.fast_time, Some(true));
        assert_eq!(config.streams, Some(vec![]));
    }

    #[tokio::test]
    async fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "streams: [").unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("broken.yaml"));
    }
}
