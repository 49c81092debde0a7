//! Level → sink routing and the options every logger reads per call.
//!
//! The routing table, global options and derived strategies live in one
//! immutable [`Snapshot`]. `configure` builds a new snapshot and swaps it in;
//! emitters load the current one without taking a lock.

use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::args::ArgOrder;
use crate::identity::ProcessIdentity;
use crate::level::Level;
use crate::sink::Sink;

/// Sinks listening at one level, in registration order.
pub type SinkList = Arc<[Arc<dyn Sink>]>;

// ---------------------------------------------------------------------------
// Configuration input
// ---------------------------------------------------------------------------

/// A sink and the lowest level it wants to receive.
#[derive(Clone)]
pub struct SinkRegistration {
    pub level: Level,
    pub sink: Arc<dyn Sink>,
}

impl SinkRegistration {
    pub fn new(level: Level, sink: Arc<dyn Sink>) -> Self {
        Self { level, sink }
    }
}

impl fmt::Debug for SinkRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistration")
            .field("level", &self.level)
            .field("sink", &self.sink.label())
            .finish()
    }
}

/// Partial update applied by [`Registry::configure`].
///
/// Unset fields keep their current value, except that a present `streams`
/// list (even an empty one) replaces the whole routing table.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub fast_time: Option<bool>,
    pub flip_args: Option<bool>,
    pub streams: Option<Vec<SinkRegistration>>,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fast_time(mut self, enabled: bool) -> Self {
        self.fast_time = Some(enabled);
        self
    }

    pub fn flip_args(mut self, enabled: bool) -> Self {
        self.flip_args = Some(enabled);
        self
    }

    /// Add one registration, starting a fresh stream list if none is set.
    pub fn stream(mut self, level: Level, sink: Arc<dyn Sink>) -> Self {
        self.streams
            .get_or_insert_with(Vec::new)
            .push(SinkRegistration::new(level, sink));
        self
    }

    /// Replace the stream list outright; `vec![]` clears all routing.
    pub fn streams(mut self, streams: Vec<SinkRegistration>) -> Self {
        self.streams = Some(streams);
        self
    }
}

/// Options read on every log call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Epoch milliseconds instead of an ISO-8601 string for `time`.
    pub fast_time: bool,
    /// `(data, message)` instead of `(message, data)`.
    pub flip_args: bool,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

struct RoutingTable {
    routes: [SinkList; Level::COUNT],
}

impl RoutingTable {
    fn empty() -> Self {
        Self::build(&[])
    }

    /// A registration at L lands in L and every more severe level.
    fn build(registrations: &[SinkRegistration]) -> Self {
        let mut lists: [Vec<Arc<dyn Sink>>; Level::COUNT] = Default::default();
        for registration in registrations {
            for level in registration.level.and_above() {
                lists[level.index()].push(Arc::clone(&registration.sink));
            }
        }
        Self {
            routes: lists.map(SinkList::from),
        }
    }

    fn sinks(&self, level: Level) -> &SinkList {
        &self.routes[level.index()]
    }
}

/// Everything an emitter needs, frozen at configure time.
pub(crate) struct Snapshot {
    pub(crate) options: GlobalOptions,
    pub(crate) order: ArgOrder,
    pub(crate) clock: fn() -> String,
    table: Arc<RoutingTable>,
}

impl Snapshot {
    fn new(options: GlobalOptions, table: Arc<RoutingTable>) -> Self {
        Self {
            options,
            order: ArgOrder::from_flip(options.flip_args),
            clock: if options.fast_time { epoch_millis } else { iso_time },
            table,
        }
    }

    pub(crate) fn sinks(&self, level: Level) -> &SinkList {
        self.table.sinks(level)
    }
}

/// Already-encoded `time` value: a bare number.
fn epoch_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Already-encoded `time` value: a quoted `YYYY-MM-DDTHH:MM:SS.mmmZ` string.
fn iso_time() -> String {
    format!("\"{}\"", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Shared routing state for a family of loggers.
///
/// Usually created once at startup and handed around as `Arc<Registry>`.
pub struct Registry {
    identity: ProcessIdentity,
    state: ArcSwap<Snapshot>,
}

impl Registry {
    /// Empty registry stamped with the current process identity.
    pub fn new() -> Self {
        Self::with_identity(ProcessIdentity::current())
    }

    pub fn with_identity(identity: ProcessIdentity) -> Self {
        let snapshot = Snapshot::new(GlobalOptions::default(), Arc::new(RoutingTable::empty()));
        Self {
            identity,
            state: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }

    /// Apply a partial update and publish it atomically.
    ///
    /// Concurrent emitters see either the previous snapshot or this one,
    /// never a half-built table.
    pub fn configure(&self, options: LogOptions) {
        let LogOptions {
            fast_time,
            flip_args,
            streams,
        } = options;

        let replaced = streams.map(|registrations| Arc::new(RoutingTable::build(&registrations)));

        let previous = self.state.rcu(|current| {
            let mut options = current.options;
            if let Some(enabled) = fast_time {
                options.fast_time = enabled;
            }
            if let Some(enabled) = flip_args {
                options.flip_args = enabled;
            }
            let table = replaced
                .clone()
                .unwrap_or_else(|| Arc::clone(&current.table));
            Arc::new(Snapshot::new(options, table))
        });

        let current = self.state.load();
        debug!(
            fast_time = current.options.fast_time,
            flip_args = current.options.flip_args,
            routes_replaced = replaced.is_some(),
            options_changed = previous.options != current.options,
            "Logger registry configured"
        );
    }

    pub fn options(&self) -> GlobalOptions {
        self.state.load().options
    }

    /// Listeners for `level`; empty when nothing is registered.
    pub fn sinks_for(&self, level: Level) -> SinkList {
        Arc::clone(self.state.load().sinks(level))
    }

    /// Lookup by level name. Unknown names route nowhere.
    pub fn sinks_for_name(&self, level: &str) -> SinkList {
        match level.parse::<Level>() {
            Ok(level) => self.sinks_for(level),
            Err(_) => SinkList::from(Vec::new()),
        }
    }

    pub(crate) fn snapshot(&self) -> Guard<Arc<Snapshot>> {
        self.state.load()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.state.load();
        let counts: Vec<_> = Level::ALL
            .into_iter()
            .map(|level| (level.as_str(), snapshot.sinks(level).len()))
            .collect();
        f.debug_struct("Registry")
            .field("identity", &self.identity)
            .field("options", &snapshot.options)
            .field("sinks", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn registry() -> Registry {
        Registry::with_identity(ProcessIdentity::new("host", 1))
    }

    fn counts(registry: &Registry) -> Vec<usize> {
        Level::ALL
            .into_iter()
            .map(|level| registry.sinks_for(level).len())
            .collect()
    }

    #[test]
    fn test_starts_empty() {
        let registry = registry();
        assert_eq!(counts(&registry), vec![0; Level::COUNT]);
        assert_eq!(registry.options(), GlobalOptions::default());
    }

    #[test]
    fn test_registration_reaches_level_and_above() {
        let registry = registry();
        registry.configure(LogOptions::new().stream(Level::Warn, Arc::new(MemorySink::new())));
        assert_eq!(counts(&registry), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let registry = registry();
        let a: Arc<dyn Sink> = Arc::new(MemorySink::new());
        let b: Arc<dyn Sink> = Arc::new(MemorySink::new());
        registry.configure(
            LogOptions::new()
                .stream(Level::Info, Arc::clone(&a))
                .stream(Level::Debug, Arc::clone(&b))
                .stream(Level::Error, Arc::clone(&a)),
        );

        assert_eq!(counts(&registry), vec![0, 1, 2, 2, 3]);

        let error = registry.sinks_for(Level::Error);
        assert!(Arc::ptr_eq(&error[0], &a));
        assert!(Arc::ptr_eq(&error[1], &b));
        assert!(Arc::ptr_eq(&error[2], &a));
    }

    #[test]
    fn test_streams_replace_not_merge() {
        let registry = registry();
        registry.configure(LogOptions::new().stream(Level::Trace, Arc::new(MemorySink::new())));
        registry.configure(LogOptions::new().stream(Level::Error, Arc::new(MemorySink::new())));
        assert_eq!(counts(&registry), vec![0, 0, 0, 0, 1]);

        registry.configure(LogOptions::new().streams(vec![]));
        assert_eq!(counts(&registry), vec![0; Level::COUNT]);
    }

    #[test]
    fn test_options_without_streams_keep_routes() {
        let registry = registry();
        registry.configure(LogOptions::new().stream(Level::Info, Arc::new(MemorySink::new())));
        registry.configure(LogOptions::new().fast_time(true));

        assert_eq!(counts(&registry), vec![0, 0, 1, 1, 1]);
        assert!(registry.options().fast_time);
        assert!(!registry.options().flip_args);
    }

    #[test]
    fn test_empty_options_are_a_no_op() {
        let registry = registry();
        registry.configure(
            LogOptions::new()
                .flip_args(true)
                .stream(Level::Debug, Arc::new(MemorySink::new())),
        );
        registry.configure(LogOptions::default());

        assert!(registry.options().flip_args);
        assert_eq!(counts(&registry), vec![0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_unknown_level_name_routes_nowhere() {
        let registry = registry();
        registry.configure(LogOptions::new().stream(Level::Trace, Arc::new(MemorySink::new())));
        assert_eq!(registry.sinks_for_name("warn").len(), 1);
        assert!(registry.sinks_for_name("fatal").is_empty());
    }

    #[test]
    fn test_clock_follows_fast_time() {
        let registry = registry();
        let iso = (registry.snapshot().clock)();
        assert!(iso.starts_with('"') && iso.ends_with("Z\""));
        assert_eq!(iso.len(), "\"2024-01-01T00:00:00.000Z\"".len());

        registry.configure(LogOptions::new().fast_time(true));
        let millis = (registry.snapshot().clock)();
        assert!(millis.parse::<i64>().is_ok());
    }
}
