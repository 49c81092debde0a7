use thiserror::Error;

/// Errors raised at the fallible edges of the logger: level names coming from
/// text and sinks that have to be opened.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    #[error("failed to open sink at {path}: {source}")]
    SinkOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
