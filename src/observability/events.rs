//! Observable events in minibase
//!
//! Events are explicit and typed. Evaluation begin/complete/failed lines
//! come from [`ObservationScope`](super::ObservationScope) instead.

use std::fmt;

use super::logger::Severity;

/// Observable events during one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded (file or defaults)
    ConfigLoaded,
    /// Catalog loaded from the schema file
    CatalogLoaded,

    // Query processing
    /// Query text parsed
    QueryParsed,
    /// Operator tree built
    PlanBuilt,
    /// Comparison never attached to any operator (dropped)
    PredicateUnattached,
    /// Result file written
    OutputWritten,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::QueryParsed => "QUERY_PARSED",
            Event::PlanBuilt => "PLAN_BUILT",
            Event::PredicateUnattached => "PREDICATE_UNATTACHED",
            Event::OutputWritten => "OUTPUT_WRITTEN",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PredicateUnattached => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::CatalogLoaded,
            Event::QueryParsed,
            Event::PlanBuilt,
            Event::PredicateUnattached,
            Event::OutputWritten,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_unattached_predicate_is_warning() {
        assert_eq!(Event::PredicateUnattached.severity(), Severity::Warn);
        assert_eq!(Event::PlanBuilt.severity(), Severity::Info);
    }
}
