//! Begin/end logging around one unit of work
//!
//! `{name}_BEGIN` is logged on creation. Exactly one closing line follows
//! when the scope is dropped: `{name}_COMPLETE`, `{name}_FAILED`, or
//! `{name}_INCOMPLETE` if neither was recorded. Closing lines carry
//! `duration_ms` and the scope's opening fields.

use std::time::Instant;

use super::logger::{Logger, Severity};

enum Outcome {
    Pending,
    Complete(Vec<(String, String)>),
    Failed(Severity, String),
}

/// Logs the start and the outcome of a unit of work.
///
/// ```ignore
/// let scope = ObservationScope::new("EVALUATION");
/// // ... do work ...
/// scope.complete_with_fields(&[("rows", "3")]);
/// ```
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(String, String)>,
    started: Instant,
    outcome: Outcome,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Opens a scope whose fields are repeated on the closing line.
    pub fn with_fields(name: &'static str, fields: &[(&str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            fields: owned(fields),
            started: Instant::now(),
            outcome: Outcome::Pending,
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.outcome = Outcome::Complete(owned(extra));
    }

    /// Records an ERROR outcome.
    pub fn fail(mut self, reason: &str) {
        self.outcome = Outcome::Failed(Severity::Error, reason.to_string());
    }

    fn close(&self) {
        let duration = self.started.elapsed().as_millis().to_string();
        let mut fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.push(("duration_ms", duration.as_str()));

        match &self.outcome {
            Outcome::Complete(extra) => {
                fields.extend(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                Logger::info(&format!("{}_COMPLETE", self.name), &fields);
            }
            Outcome::Failed(severity, reason) => {
                fields.push(("reason", reason.as_str()));
                Logger::log(*severity, &format!("{}_FAILED", self.name), &fields);
            }
            Outcome::Pending => {
                Logger::warn(&format!("{}_INCOMPLETE", self.name), &fields);
            }
        }
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        self.close();
    }
}

fn owned(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
