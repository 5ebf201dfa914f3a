//! Race aggregate and its state machine
//!
//! Status only moves forward: setup → checkin → active → finished. The
//! start time is the origin of every elapsed-ms value and is set exactly
//! once, when the race goes active.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::ClockSnapshot;
use crate::finish::{FinishFlag, FinishRecorder};
use crate::registration::TempNumberIssuer;
use crate::results::DistanceResults;
use crate::timing::Handicap;

use super::{Distance, MemberNumber, Membership, RaceError, Runner, RunnerStatus};

/// Race lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    #[default]
    Setup,
    Checkin,
    Active,
    Finished,
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RaceStatus::Setup => "setup",
            RaceStatus::Checkin => "checkin",
            RaceStatus::Active => "active",
            RaceStatus::Finished => "finished",
        })
    }
}

/// A single race day: roster, finishes and the temp-number counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub date: NaiveDate,

    #[serde(default)]
    status: RaceStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<DateTime<Utc>>,

    #[serde(default = "default_active")]
    pub active_5k: bool,

    #[serde(default = "default_active")]
    pub active_10k: bool,

    /// Race clock as of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    clock: Option<ClockSnapshot>,

    #[serde(default)]
    temp_numbers: TempNumberIssuer,

    /// Insertion order is check-in order and breaks ranking ties
    #[serde(default)]
    runners: Vec<Runner>,

    #[serde(default)]
    finishes: FinishRecorder,
}

fn default_active() -> bool {
    true
}

impl Race {
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            status: RaceStatus::Setup,
            start_time: None,
            active_5k: true,
            active_10k: true,
            clock: None,
            temp_numbers: TempNumberIssuer::new(),
            runners: Vec::new(),
            finishes: FinishRecorder::new(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    pub fn runner(&self, member_number: MemberNumber) -> Option<&Runner> {
        self.runners.iter().find(|r| r.member_number == member_number)
    }

    pub fn checked_in_runners(&self) -> impl Iterator<Item = &Runner> {
        self.runners.iter().filter(|r| r.checked_in)
    }

    pub fn finishes(&self) -> &FinishRecorder {
        &self.finishes
    }

    pub fn temp_numbers(&self) -> &TempNumberIssuer {
        &self.temp_numbers
    }

    pub fn clock_snapshot(&self) -> Option<&ClockSnapshot> {
        self.clock.as_ref()
    }

    pub fn set_clock_snapshot(&mut self, snapshot: ClockSnapshot) {
        self.clock = Some(snapshot);
    }

    pub fn is_distance_active(&self, distance: Distance) -> bool {
        match distance {
            Distance::FiveK => self.active_5k,
            Distance::TenK => self.active_10k,
        }
    }

    /// Milliseconds since the start, measured on the wall clock
    pub fn elapsed_ms_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.start_time
            .map(|start| now.signed_duration_since(start).num_milliseconds())
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    pub fn open_checkin(&mut self) -> Result<(), RaceError> {
        self.transition(RaceStatus::Setup, RaceStatus::Checkin)
    }

    /// Go active. The start time can only ever be set once.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<(), RaceError> {
        if let Some(start_time) = self.start_time {
            return Err(RaceError::AlreadyStarted { start_time });
        }
        self.transition(RaceStatus::Checkin, RaceStatus::Active)?;
        self.start_time = Some(at);
        info!(race = %self.id, start_time = %at, "Race started");
        Ok(())
    }

    /// Finalize. Finishes are frozen from here on.
    pub fn finish(&mut self) -> Result<(), RaceError> {
        self.transition(RaceStatus::Active, RaceStatus::Finished)
    }

    fn transition(&mut self, from: RaceStatus, to: RaceStatus) -> Result<(), RaceError> {
        if self.status != from {
            return Err(RaceError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        info!(race = %self.id, %from, %to, "Race status changed");
        Ok(())
    }

    // ─── Roster ─────────────────────────────────────────────────────────────

    pub fn set_distance_active(&mut self, distance: Distance, active: bool) -> Result<(), RaceError> {
        self.ensure_roster_open()?;
        match distance {
            Distance::FiveK => self.active_5k = active,
            Distance::TenK => self.active_10k = active,
        }
        Ok(())
    }

    pub fn add_runner(&mut self, runner: Runner) -> Result<(), RaceError> {
        self.ensure_roster_open()?;
        if self.runner(runner.member_number).is_some() {
            return Err(RaceError::DuplicateMember {
                member_number: runner.member_number,
            });
        }
        self.runners.push(runner);
        Ok(())
    }

    /// Check a runner in. Late arrivals may still check in once the race is
    /// active. Check-in moves the runner to the back of the roster so
    /// roster order stays check-in order.
    pub fn check_in(&mut self, member_number: MemberNumber) -> Result<(), RaceError> {
        if !matches!(self.status, RaceStatus::Checkin | RaceStatus::Active) {
            return Err(RaceError::NotAcceptingCheckins {
                status: self.status,
            });
        }

        let idx = self.index_of(member_number)?;
        let distance = self.runners[idx].distance;
        if !self.is_distance_active(distance) {
            return Err(RaceError::DistanceInactive { distance });
        }
        if self.runners[idx].checked_in {
            return Ok(());
        }

        let mut runner = self.runners.remove(idx);
        runner.checked_in = true;
        debug!(member_number, name = %runner.full_name, "Runner checked in");
        self.runners.push(runner);
        Ok(())
    }

    /// Register and check in a runner who turned up on the day, issuing a
    /// temporary race number.
    pub fn register_on_the_day(
        &mut self,
        full_name: impl Into<String>,
        distance: Distance,
        handicap: Handicap,
        membership: Membership,
    ) -> Result<MemberNumber, RaceError> {
        if !matches!(self.status, RaceStatus::Checkin | RaceStatus::Active) {
            return Err(RaceError::NotAcceptingCheckins {
                status: self.status,
            });
        }
        if !self.is_distance_active(distance) {
            return Err(RaceError::DistanceInactive { distance });
        }

        // Numbers already on the roster are skipped, never reused
        let member_number = loop {
            let candidate = self
                .temp_numbers
                .issue()
                .ok_or(RaceError::TempNumbersExhausted)?;
            if self.runner(candidate).is_none() {
                break candidate;
            }
            debug!(member_number = candidate, "Temp number taken, skipping");
        };

        let mut runner = Runner::new(member_number, full_name, distance)
            .with_handicap(handicap)
            .with_membership(membership);
        runner.checked_in = true;
        info!(member_number, name = %runner.full_name, %distance, "Registered on the day");
        self.runners.push(runner);
        Ok(member_number)
    }

    /// Move checked-in runners whose cohort has gone to `Racing`.
    /// Returns how many changed.
    pub fn mark_started_runners(&mut self, elapsed_ms: i64) -> usize {
        if self.status != RaceStatus::Active {
            return 0;
        }
        let mut started = 0;
        for runner in self.runners.iter_mut().filter(|r| r.checked_in) {
            if runner.status == RunnerStatus::NotStarted && runner.start_offset_ms() <= elapsed_ms {
                runner.status = RunnerStatus::Racing;
                started += 1;
            }
        }
        started
    }

    // ─── Finishes ───────────────────────────────────────────────────────────

    pub fn record_finish(&mut self, member_number: MemberNumber, elapsed_ms: i64) -> Result<RunnerStatus, RaceError> {
        let idx = self.finish_target(member_number)?;
        if elapsed_ms < 0 {
            return Err(RaceError::NegativeFinishTime {
                member_number,
                elapsed_ms,
            });
        }
        let status = self.finishes.record_finish(member_number, elapsed_ms);
        self.runners[idx].status = status;
        debug!(member_number, elapsed_ms, "Finish recorded");
        Ok(status)
    }

    pub fn set_flag(&mut self, member_number: MemberNumber, flag: FinishFlag) -> Result<RunnerStatus, RaceError> {
        let idx = self.finish_target(member_number)?;
        let status = self.finishes.set_flag(member_number, flag);
        self.runners[idx].status = status;
        debug!(member_number, ?flag, "Finish flag set");
        Ok(status)
    }

    pub fn edit_time(&mut self, member_number: MemberNumber, minutes: i64, seconds: f64) -> Result<RunnerStatus, RaceError> {
        let idx = self.finish_target(member_number)?;
        let status = self.finishes.edit_time(member_number, minutes, seconds);
        self.runners[idx].status = status;
        info!(member_number, minutes, seconds, "Finish time edited");
        Ok(status)
    }

    /// Forget a runner's finish; they are back out on the course
    pub fn clear_finish(&mut self, member_number: MemberNumber) -> Result<(), RaceError> {
        let idx = self.finish_target(member_number)?;
        self.finishes.clear(member_number);
        self.runners[idx].status = RunnerStatus::Racing;
        Ok(())
    }

    // ─── Results ────────────────────────────────────────────────────────────

    /// Carry recalculated handicaps onto the roster for the next race
    pub fn apply_results(&mut self, results: &[DistanceResults]) -> Result<usize, RaceError> {
        if self.status != RaceStatus::Finished {
            return Err(RaceError::InvalidTransition {
                from: self.status,
                to: RaceStatus::Finished,
            });
        }
        let mut changed = 0;
        for row in results.iter().flat_map(|d| d.rows.iter()) {
            if let Some(runner) = self
                .runners
                .iter_mut()
                .find(|r| r.member_number == row.member_number)
                && runner.handicap() != row.new_handicap
            {
                runner.set_handicap(row.new_handicap);
                changed += 1;
            }
        }
        info!(race = %self.id, changed, "Applied new handicaps");
        Ok(changed)
    }

    // ─── Helpers ────────────────────────────────────────────────────────────

    fn ensure_roster_open(&self) -> Result<(), RaceError> {
        match self.status {
            RaceStatus::Setup | RaceStatus::Checkin => Ok(()),
            status => Err(RaceError::RosterClosed { status }),
        }
    }

    fn index_of(&self, member_number: MemberNumber) -> Result<usize, RaceError> {
        self.runners
            .iter()
            .position(|r| r.member_number == member_number)
            .ok_or(RaceError::UnknownRunner { member_number })
    }

    /// Gate for every finish operation: active race, known checked-in runner
    fn finish_target(&self, member_number: MemberNumber) -> Result<usize, RaceError> {
        if self.status != RaceStatus::Active {
            return Err(RaceError::NotActive {
                status: self.status,
            });
        }
        let idx = self.index_of(member_number)?;
        if !self.runners[idx].checked_in {
            return Err(RaceError::NotCheckedIn { member_number });
        }
        Ok(idx)
    }
}
