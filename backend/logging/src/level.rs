use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Severity tiers, lowest first. The derived ordering is the routing threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const COUNT: usize = 5;

    /// Every level in ascending severity.
    pub const ALL: [Level; Level::COUNT] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// This level and every more severe one, in ascending order.
    pub fn and_above(self) -> impl Iterator<Item = Level> {
        Level::ALL.into_iter().skip(self.index())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| LogError::UnknownLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_and_above() {
        let above: Vec<_> = Level::Warn.and_above().collect();
        assert_eq!(above, vec![Level::Warn, Level::Error]);
        assert_eq!(Level::Trace.and_above().count(), Level::COUNT);
    }

    #[test]
    fn test_parse_round_trips_names() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "fatal".parse::<Level>().unwrap_err();
        assert!(matches!(err, LogError::UnknownLevel(ref name) if name == "fatal"));
        assert!("INFO".parse::<Level>().is_err());
    }
}
