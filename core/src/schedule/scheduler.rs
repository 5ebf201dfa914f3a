//! Cohort projection
//!
//! Buckets checked-in runners by exact start offset and classifies each
//! bucket against the race-elapsed time. Total over any roster and any
//! elapsed value, negative or huge.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::race::Runner;

use super::{CohortMember, StartGroup};

/// Cohorts stay in the live view this long after their start
pub const VISIBLE_AFTER_START_MS: i64 = 2000;

/// A cohort is "starting" when its start is at most this far away
pub const STARTING_WINDOW_MS: i64 = 3000;

pub const ALL_STARTED_MESSAGE: &str = "All runners have started";

/// How the schedule is being viewed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ProjectionMode {
    /// Before the gun: every cohort shown, none started
    PreRace,
    /// Race clock running
    #[default]
    Live,
}

/// Group checked-in runners into cohorts for the given elapsed time.
///
/// Cohorts come back in ascending start order. Runners with no handicap
/// are grouped at offset 0.
pub fn project_cohorts<'a>(
    runners: impl IntoIterator<Item = &'a Runner>,
    elapsed_ms: i64,
    mode: ProjectionMode,
) -> Vec<StartGroup> {
    let mut buckets: BTreeMap<i64, Vec<CohortMember>> = BTreeMap::new();
    for runner in runners.into_iter().filter(|r| r.checked_in) {
        buckets
            .entry(runner.start_offset_ms())
            .or_default()
            .push(CohortMember::from(runner));
    }

    let pre_race = mode == ProjectionMode::PreRace;

    buckets
        .into_iter()
        .map(|(start_offset_ms, runners)| StartGroup {
            start_offset_ms,
            runners,
            time_until_start_ms: start_offset_ms.saturating_sub(elapsed_ms),
            has_started: !pre_race && start_offset_ms <= elapsed_ms,
        })
        .filter(|group| pre_race || group.time_until_start_ms > -VISIBLE_AFTER_START_MS)
        .collect()
}

/// One tick's worth of cohorts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub elapsed_ms: i64,
    pub mode: ProjectionMode,
    pub cohorts: Vec<StartGroup>,
}

impl Schedule {
    pub fn project<'a>(
        runners: impl IntoIterator<Item = &'a Runner>,
        elapsed_ms: i64,
        mode: ProjectionMode,
    ) -> Self {
        Self {
            elapsed_ms,
            mode,
            cohorts: project_cohorts(runners, elapsed_ms, mode),
        }
    }

    /// First cohort still waiting to go
    pub fn next(&self) -> Option<&StartGroup> {
        self.cohorts.iter().find(|c| !c.has_started)
    }

    /// Cohorts that have not started yet
    pub fn upcoming(&self) -> impl Iterator<Item = &StartGroup> {
        self.cohorts.iter().filter(|c| !c.has_started)
    }

    pub fn all_started(&self) -> bool {
        self.next().is_none()
    }

    /// Headline for the start screen
    pub fn status_message(&self) -> String {
        match self.next() {
            None => ALL_STARTED_MESSAGE.to_string(),
            Some(next) if self.mode == ProjectionMode::PreRace => {
                format!("Next: {}", next.label())
            }
            Some(next) => format!("Next: {} in {}", next.label(), next.countdown_text()),
        }
    }
}
