//! One-shot start alerts per cohort
//!
//! Ticks land at a fixed cadence, so the trigger is a half-open band
//! `(lead - window, lead]` rather than an instant. The triggered set keeps
//! the band from firing twice when several ticks sample it.

use std::collections::BTreeSet;

use stagger_types::AlertSettings;
use tracing::debug;

use crate::schedule::{ProjectionMode, Schedule};

use super::AlertRequest;

/// Decides which cohorts are due their alert on each tick.
///
/// The only state carried between ticks is the set of cohort keys
/// (start offsets) already alerted. Pausing the clock leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct AlertDispatcher {
    settings: AlertSettings,
    triggered: BTreeSet<i64>,
}

impl AlertDispatcher {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            settings,
            triggered: BTreeSet::new(),
        }
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    /// Swap settings at runtime; the triggered set is kept
    pub fn set_settings(&mut self, settings: AlertSettings) {
        self.settings = settings;
    }

    /// Evaluate one tick. Returns the alerts to deliver now.
    pub fn evaluate(&mut self, schedule: &Schedule) -> Vec<AlertRequest> {
        self.evict(schedule.elapsed_ms);

        if !self.settings.enabled || schedule.mode == ProjectionMode::PreRace {
            return Vec::new();
        }

        let floor = self.settings.window_floor_ms();
        let lead = self.settings.lead_ms;
        let mut requests = Vec::new();

        for cohort in schedule.upcoming() {
            let until = cohort.time_until_start_ms;
            if until > floor && until <= lead && self.triggered.insert(cohort.start_offset_ms) {
                debug!(
                    start_offset_ms = cohort.start_offset_ms,
                    time_until_start_ms = until,
                    runners = cohort.runners.len(),
                    "Start alert triggered"
                );
                requests.push(AlertRequest::for_cohort(cohort));
            }
        }

        requests
    }

    /// Forget cohorts that started more than `retain_ms` ago
    pub fn evict(&mut self, elapsed_ms: i64) {
        let retain = self.settings.retain_ms;
        self.triggered
            .retain(|offset| elapsed_ms.saturating_sub(*offset) <= retain);
    }

    pub fn is_triggered(&self, start_offset_ms: i64) -> bool {
        self.triggered.contains(&start_offset_ms)
    }

    pub fn triggered_count(&self) -> usize {
        self.triggered.len()
    }

    /// Clear all state for a new race
    pub fn reset(&mut self) {
        self.triggered.clear();
    }
}
