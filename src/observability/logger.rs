//! Structured JSON logger for minibase
//!
//! One line per event on stderr: `event` and `severity` first, then the
//! event's fields sorted by key. Stdout is left to plan explanations.
//!
//! The threshold is process-wide and defaults to WARN.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-step detail
    Trace = 0,
    /// Lifecycle progress
    Info = 1,
    /// Something was dropped or ignored
    Warn = 2,
    /// The evaluation failed
    Error = 3,
    /// The evaluation cannot continue at all
    Fatal = 4,
}

const LEVELS: [Severity; 5] = [
    Severity::Trace,
    Severity::Info,
    Severity::Warn,
    Severity::Error,
    Severity::Fatal,
];

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(value: u8) -> Self {
        LEVELS
            .get(value as usize)
            .copied()
            .unwrap_or(Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Case-insensitive level name, e.g. `warn` or `INFO`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LEVELS
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid log level: {}. Must be one of trace, info, warn, error, fatal",
                    s
                )
            })
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

/// Wire shape of one log line.
#[derive(Serialize)]
struct LogLine<'a> {
    event: &'a str,
    severity: &'static str,
    #[serde(flatten)]
    fields: BTreeMap<&'a str, &'a str>,
}

impl<'a> LogLine<'a> {
    fn new(severity: Severity, event: &'a str, fields: &[(&'a str, &'a str)]) -> Self {
        Self {
            event,
            severity: severity.as_str(),
            fields: fields.iter().copied().collect(),
        }
    }

    fn render(&self) -> String {
        // A map of strings always serializes.
        let mut line = serde_json::to_string(self).unwrap_or_default();
        line.push('\n');
        line
    }
}

/// Process-wide structured logger
pub struct Logger;

impl Logger {
    pub fn set_level(level: Severity) {
        MIN_SEVERITY.store(level as u8, Ordering::Relaxed);
    }

    pub fn level() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::level()
    }

    /// Writes one line if `severity` passes the threshold. Write failures
    /// are ignored.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = LogLine::new(severity, event, fields).render();
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }
}

/// Renders a line without writing it, ignoring the threshold.
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    LogLine::new(severity, event, fields).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("INFO".parse::<Severity>().unwrap(), Severity::Info);
        assert!("loud".parse::<Severity>().is_err());
        for value in 0..5u8 {
            assert_eq!(Severity::from_u8(value) as u8, value);
        }
        assert_eq!(Severity::from_u8(200), Severity::Fatal);
    }

    #[test]
    fn test_log_json_format() {
        let output = capture_log(Severity::Info, "TEST_EVENT", &[]);
        assert_eq!(output, "{\"event\":\"TEST_EVENT\",\"severity\":\"INFO\"}\n");
    }

    #[test]
    fn test_log_fields_sorted_and_escaped() {
        let output = capture_log(
            Severity::Warn,
            "PREDICATE_UNATTACHED",
            &[("predicate", "x = \"a\""), ("atoms", "3")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["predicate"], "x = \"a\"");
        assert!(output.starts_with("{\"event\":"));
        assert!(output.find("atoms").unwrap() < output.find("predicate").unwrap());
        assert!(output.ends_with('\n'));
    }
}
