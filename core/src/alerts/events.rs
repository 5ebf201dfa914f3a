//! Alert event types passed from the dispatcher to delivery

use crate::schedule::StartGroup;

/// A cohort is due its "go" signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    /// Cohort key
    pub start_offset_ms: i64,

    /// e.g. `Start Delay: 01:30`
    pub label: String,

    pub runner_names: Vec<String>,
}

impl AlertRequest {
    pub fn for_cohort(cohort: &StartGroup) -> Self {
        Self {
            start_offset_ms: cohort.start_offset_ms,
            label: cohort.label(),
            runner_names: cohort.runner_names(),
        }
    }

    /// Text for the fallback visual alert
    pub fn message(&self) -> String {
        if self.runner_names.is_empty() {
            format!("GET READY: {}", self.label)
        } else {
            format!("GET READY: {}: {}", self.label, self.runner_names.join(", "))
        }
    }
}

/// How an alert reached the start line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Audio,
    /// Audio failed; visual alert raised, `vibrated` if the pulse went out
    Fallback { vibrated: bool },
}
