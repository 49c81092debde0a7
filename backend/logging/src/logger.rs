//! Hierarchical loggers.
//!
//! A [`Logger`] is a name plus an inherited parameter bag bound to a
//! [`Registry`]. It never changes after construction; [`Logger::child`]
//! derives a new one.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::level::Level;
use crate::registry::Registry;
use crate::serialize::{object_body, serialize};
use crate::value::Params;

/// Joins a parent name and a child suffix.
pub const NAME_SEPARATOR: char = ':';

#[derive(Clone)]
pub struct Logger {
    registry: Arc<Registry>,
    name: String,
    params: Params,
    /// Pre-encoded `"hostname":…,"pid":…,"name":…[,params…]`.
    base: Arc<str>,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $with:ident;)*) => {
        $(
            #[doc = concat!("Log a single argument at `", stringify!($plain), "`.")]
            pub fn $plain(&self, first: impl Into<Value>) {
                self.log(Level::$level, Some(first.into()), None);
            }

            #[doc = concat!(
                "Log two arguments at `", stringify!($plain),
                "`; their roles follow the registry's argument order."
            )]
            pub fn $with(&self, first: impl Into<Value>, second: impl Into<Value>) {
                self.log(Level::$level, Some(first.into()), Some(second.into()));
            }
        )*
    };
}

impl Logger {
    pub fn new(registry: &Arc<Registry>, name: impl Into<String>, params: Params) -> Self {
        let name = name.into();
        let base = encode_base(registry, &name, &params);
        Self {
            registry: Arc::clone(registry),
            name,
            params,
            base: base.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// `self.name:name`, or the same name when `name` is empty.
    pub fn child(&self, name: &str) -> Logger {
        self.child_with(name, &Params::new())
    }

    /// Like [`Logger::child`], with `params` laid over a copy of ours.
    pub fn child_with(&self, name: &str, params: &Params) -> Logger {
        let name = if name.is_empty() {
            self.name.clone()
        } else {
            format!("{}{NAME_SEPARATOR}{name}", self.name)
        };
        Logger::new(&self.registry, name, self.params.merged(params))
    }

    /// Emit one record at `level`.
    ///
    /// Returns before doing any work when nobody listens at `level` or when
    /// the arguments resolve to no message. Each listening sink gets one
    /// write; a failing sink is reported and skipped.
    pub fn log(&self, level: Level, first: Option<Value>, second: Option<Value>) {
        let snapshot = self.registry.snapshot();
        let sinks = snapshot.sinks(level);
        if sinks.is_empty() {
            return;
        }

        let Some(entry) = snapshot.order.resolve(first, second) else {
            return;
        };

        let line = format!(
            "{{\"time\":{},{},\"level\":\"{}\",{}}}\n",
            (snapshot.clock)(),
            self.base,
            level,
            serialize(&entry.message, entry.data),
        );

        for sink in sinks.iter() {
            if let Err(err) = sink.write_line(&line) {
                warn!(
                    target: "linelog::sink",
                    sink = sink.label(),
                    logger = %self.name,
                    level = %level,
                    error = %err,
                    "Sink write failed"
                );
            }
        }
    }

    /// Whether a call at `level` would reach any sink right now.
    pub fn enabled(&self, level: Level) -> bool {
        !self.registry.snapshot().sinks(level).is_empty()
    }

    level_methods! {
        Trace => trace, trace_with;
        Debug => debug, debug_with;
        Info => info, info_with;
        Warn => warn, warn_with;
        Error => error, error_with;
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

fn encode_base(registry: &Registry, name: &str, params: &Params) -> String {
    let identity = registry.identity();
    let mut fixed = Map::new();
    fixed.insert("hostname".into(), Value::String(identity.hostname.clone()));
    fixed.insert("pid".into(), Value::from(identity.pid));
    fixed.insert("name".into(), Value::String(name.to_string()));

    let mut base = object_body(fixed);
    let params = params.to_map();
    if !params.is_empty() {
        base.push(',');
        base.push_str(&object_body(params));
    }
    base
}
