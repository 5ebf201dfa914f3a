//! Start group (cohort) view

use serde::Serialize;

use crate::race::{Distance, MemberNumber, Runner};
use crate::timing;

use super::STARTING_WINDOW_MS;

/// Runner entry inside a cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortMember {
    pub member_number: MemberNumber,
    pub full_name: String,
    pub distance: Distance,
}

impl From<&Runner> for CohortMember {
    fn from(runner: &Runner) -> Self {
        Self {
            member_number: runner.member_number,
            full_name: runner.full_name.clone(),
            distance: runner.distance,
        }
    }
}

/// Runners sharing one start offset, with fields derived for the current tick.
/// Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartGroup {
    pub start_offset_ms: i64,
    pub runners: Vec<CohortMember>,
    pub time_until_start_ms: i64,
    pub has_started: bool,
}

impl StartGroup {
    /// e.g. `Start Delay: 01:30`
    pub fn label(&self) -> String {
        format!("Start Delay: {}", timing::format(self.start_offset_ms))
    }

    /// `STARTED` once gone, otherwise a rounded-up countdown
    pub fn countdown_text(&self) -> String {
        if self.has_started {
            "STARTED".to_string()
        } else {
            timing::format_countdown(self.time_until_start_ms)
        }
    }

    /// Within the last few seconds before the start
    pub fn is_starting(&self) -> bool {
        self.time_until_start_ms > 0 && self.time_until_start_ms <= STARTING_WINDOW_MS
    }

    /// One line of the start board. Cohorts about to go are marked `>>`.
    pub fn board_line(&self) -> String {
        let marker = if self.is_starting() { ">>" } else { "  " };
        format!(
            "{marker}{:<20} {:>8}  {}",
            self.label(),
            self.countdown_text(),
            self.runner_names().join(", ")
        )
    }

    pub fn runner_names(&self) -> Vec<String> {
        self.runners.iter().map(|r| r.full_name.clone()).collect()
    }

    pub fn contains(&self, member_number: MemberNumber) -> bool {
        self.runners.iter().any(|r| r.member_number == member_number)
    }
}
