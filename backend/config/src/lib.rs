//! `linelog-config` — declarative sink configuration for linelog.
//!
//! Provides:
//! - Typed config schema (options + stream list)
//! - YAML/JSON loading
//! - `${ENV_VAR}` substitution
//! - `LINELOG_*` environment overrides

pub mod env;
pub mod io;
pub mod schema;

pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, parse_config, ConfigFormat};
pub use schema::{LoggingConfig, SinkTarget, StreamConfig};

use anyhow::{Context, Result};
use linelog::Registry;
use std::path::Path;
use tracing::info;

/// Open the config's sinks and install them on `registry`.
///
/// Sinks are all opened before the registry is touched, so a bad stream
/// leaves the current routing in place.
pub fn apply(registry: &Registry, config: LoggingConfig) -> Result<()> {
    let stream_count = config.streams.as_ref().map(Vec::len);
    let options = config
        .into_options()
        .context("Failed to open logging sinks")?;
    registry.configure(options);
    info!(streams = ?stream_count, "Applied logging config");
    Ok(())
}

/// Load a config file, apply env overrides, and install it on `registry`.
///
/// This is the main entry point for configuring logging at startup.
pub async fn load_and_apply(registry: &Registry, path: &Path) -> Result<LoggingConfig> {
    let mut config = load_config(path).await?;
    apply_env_overrides(&mut config);
    apply(registry, config.clone())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linelog::{Level, Logger, Params, ProcessIdentity};
    use std::sync::Arc;

    #[test]
    fn test_apply_routes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        let registry = Arc::new(Registry::with_identity(ProcessIdentity::new("h", 9)));

        let config = LoggingConfig {
            streams: Some(vec![StreamConfig {
                level: "warn".into(),
                target: SinkTarget::File(log_path.clone()),
            }]),
            ..Default::default()
        };
        apply(&registry, config).unwrap();

        assert!(registry.sinks_for(Level::Info).is_empty());
        assert_eq!(registry.sinks_for(Level::Error).len(), 1);

        let log = Logger::new(&registry, "TEST", Params::new());
        log.info("dropped");
        log.warn("kept");

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("\"msg\":\"kept\""));
    }

    #[test]
    fn test_bad_stream_leaves_routing_alone() {
        let registry = Registry::with_identity(ProcessIdentity::new("h", 9));
        let good = LoggingConfig::from_yaml_str("streams:\n  - level: info\n    target: stderr\n")
            .unwrap();
        apply(&registry, good).unwrap();

        let bad = LoggingConfig::from_yaml_str("streams:\n  - level: loud\n    target: stderr\n")
            .unwrap();
        assert!(apply(&registry, bad).is_err());
        assert_eq!(registry.sinks_for(Level::Info).len(), 1);
    }

    #[tokio::test]
    async fn test_load_and_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.yaml");
        std::fs::write(
            &path,
            "fast_time: true\nstreams:\n  - level: debug\n    target: stdout\n",
        )
        .unwrap();

        let registry = Registry::with_identity(ProcessIdentity::new("h", 9));
        load_and_apply(&registry, &path).await.unwrap();

        assert_eq!(registry.sinks_for(Level::Trace).len(), 0);
        assert_eq!(registry.sinks_for(Level::Debug).len(), 1);
    }
}
