//! `linelog`: hierarchical loggers that write one JSON object per line.
//!
//! A [`Registry`] owns the level → sink routing and the per-call options.
//! [`Logger`]s bound to it carry a colon-joined name and inherited params,
//! and expose one method per [`Level`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use linelog::{Level, LogOptions, Logger, Params, Registry, StderrSink};
//!
//! let registry = Arc::new(Registry::new());
//! registry.configure(LogOptions::new().stream(Level::Info, Arc::new(StderrSink)));
//!
//! let log = Logger::new(&registry, "api", Params::new().with("region", "eu"));
//! log.child("http").info_with("listening", serde_json::json!({ "port": 8080 }));
//! ```

pub mod args;
pub mod error;
pub mod identity;
pub mod level;
pub mod logger;
pub mod registry;
pub mod serialize;
pub mod sink;
pub mod value;

pub use args::{ArgOrder, Entry};
pub use error::LogError;
pub use identity::ProcessIdentity;
pub use level::Level;
pub use logger::{Logger, NAME_SEPARATOR};
pub use registry::{GlobalOptions, LogOptions, Registry, SinkList, SinkRegistration};
pub use serialize::{serialize, MESSAGE_FIELD};
pub use sink::{FileSink, MemorySink, Sink, StderrSink, StdoutSink, WriterSink};
pub use value::{ErrorInfo, LoggableValue, Params};
