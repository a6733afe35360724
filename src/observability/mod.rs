//! Observability subsystem for minibase
//!
//! - Structured logging (JSON, one line per event, stderr)
//! - Typed lifecycle events
//! - Scope-based begin/complete logging with durations
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on evaluation; a failed log write is ignored
//! 3. No background threads
//! 4. Deterministic output (fields sorted by key)
//!
//! The default threshold is WARN, so a successful evaluation writes nothing.
//!
//! ```ignore
//! use minibase::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::CatalogLoaded, &[("relations", "3")]);
//!
//! let scope = ObservationScope::new("EVALUATION");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::QueryParsed);
        log_event(Event::PlanBuilt);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::CatalogLoaded, &[("db_dir", "/tmp/test")]);
    }
}
