//! Typed logging config schema.
//!
//! ```yaml
//! fast_time: true
//! streams:
//!   - level: warn
//!     target: stderr
//!   - level: trace
//!     target:
//!       file: ${LOG_DIR}/app.log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use linelog::{FileSink, Level, LogOptions, Sink, SinkRegistration, StderrSink, StdoutSink};
use serde::de::{self, Unexpected};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root of the logging config file. Every field is optional; a present
/// `streams` list (even empty) replaces the registry's routing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_time: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_args: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<Vec<StreamConfig>>,
}

/// One sink and the lowest level it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Level name (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,

    pub target: SinkTarget,
}

/// Where a stream writes. Written as `stdout`, `stderr` or `{ file: <path> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    Stderr,
    /// Appended to, creating parent directories as needed.
    File(PathBuf),
}

impl Serialize for SinkTarget {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SinkTarget::Stdout => serializer.serialize_str("stdout"),
            SinkTarget::Stderr => serializer.serialize_str("stderr"),
            SinkTarget::File(path) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("file", path)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for SinkTarget {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NameOrFile {
            Name(String),
            File { file: PathBuf },
        }

        match NameOrFile::deserialize(deserializer)? {
            NameOrFile::Name(name) => match name.as_str() {
                "stdout" => Ok(SinkTarget::Stdout),
                "stderr" => Ok(SinkTarget::Stderr),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"stdout, stderr or { file: <path> }",
                )),
            },
            NameOrFile::File { file } => Ok(SinkTarget::File(file)),
        }
    }
}

impl StreamConfig {
    /// Parse the level and open the sink.
    pub fn open(&self) -> Result<SinkRegistration> {
        let level: Level = self.level.parse()?;

        let sink: Arc<dyn Sink> = match &self.target {
            SinkTarget::Stdout => Arc::new(StdoutSink),
            SinkTarget::Stderr => Arc::new(StderrSink),
            SinkTarget::File(path) => Arc::new(FileSink::open(path)?),
        };

        Ok(SinkRegistration::new(level, sink))
    }
}

impl LoggingConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse logging config YAML")
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse logging config JSON")
    }

    /// Open every configured sink and build the registry update.
    pub fn into_options(self) -> Result<LogOptions> {
        let streams = match self.streams {
            Some(streams) => Some(
                streams
                    .iter()
                    .enumerate()
                    .map(|(i, stream)| {
                        stream
                            .open()
                            .with_context(|| format!("Invalid logging stream at streams[{i}]"))
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        Ok(LogOptions {
            fast_time: self.fast_time,
            flip_args: self.flip_args,
            streams,
        })
    }
}
