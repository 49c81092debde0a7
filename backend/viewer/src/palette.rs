//! ANSI colors used for rendered records.

use linelog::Level;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";

/// Color prefix for a record's `level` field; empty for names we don't know.
pub fn level_color(level: &str) -> &'static str {
    match level.parse::<Level>() {
        Ok(Level::Trace | Level::Debug) => DIM,
        Ok(Level::Info) => BOLD,
        Ok(Level::Warn) => YELLOW,
        Ok(Level::Error) => RED,
        Err(_) => "",
    }
}

/// Plain text of a rendered line, for assertions.
#[cfg(test)]
pub(crate) fn strip_ansi(text: &str) -> String {
    let mut parts = text.split('\x1b');
    let mut plain = parts.next().unwrap_or_default().to_string();
    for part in parts {
        plain.push_str(part.split_once('m').map_or("", |(_, rest)| rest));
    }
    plain
}
