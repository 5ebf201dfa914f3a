//! Finish records keyed by member number
//!
//! A second capture simply replaces the first, which is how misclicks are
//! corrected. Runner status is derived from the record, see
//! [`FinishRecord::status`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::race::{MemberNumber, RunnerStatus};
use crate::timing::{self, MS_PER_SEC};

/// Flag overriding a timed finish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishFlag {
    #[default]
    None,
    Dnf,
    EarlyStart,
}

impl FinishFlag {
    fn is_none(&self) -> bool {
        matches!(self, FinishFlag::None)
    }
}

/// One runner's finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub member_number: MemberNumber,

    /// Time since the race start; absent when only a flag was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_elapsed_ms: Option<i64>,

    /// Set when the race director edited the captured time
    #[serde(default)]
    pub manual_override: bool,

    #[serde(default, skip_serializing_if = "FinishFlag::is_none")]
    pub flag: FinishFlag,
}

impl FinishRecord {
    fn new(member_number: MemberNumber) -> Self {
        Self {
            member_number,
            finish_elapsed_ms: None,
            manual_override: false,
            flag: FinishFlag::None,
        }
    }

    /// Runner status implied by this record
    pub fn status(&self) -> RunnerStatus {
        match (self.flag, self.finish_elapsed_ms) {
            (FinishFlag::Dnf, _) => RunnerStatus::Dnf,
            (FinishFlag::EarlyStart, _) => RunnerStatus::EarlyStart,
            (FinishFlag::None, Some(_)) => RunnerStatus::Finished,
            (FinishFlag::None, None) => RunnerStatus::Racing,
        }
    }

    /// Timed finish that counts for placings
    pub fn ranked_time_ms(&self) -> Option<i64> {
        if self.flag.is_none() {
            self.finish_elapsed_ms
        } else {
            None
        }
    }

    /// Finish time as `MM:SS`, if one was captured
    pub fn finish_time(&self) -> Option<String> {
        self.finish_elapsed_ms.map(timing::format)
    }
}

/// All finish records for a race
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FinishRecord>", into = "Vec<FinishRecord>")]
pub struct FinishRecorder {
    records: BTreeMap<MemberNumber, FinishRecord>,
}

impl FinishRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture (or re-capture) a finish. Clears any flag.
    pub fn record_finish(&mut self, member_number: MemberNumber, elapsed_ms: i64) -> RunnerStatus {
        let record = self.entry(member_number);
        record.finish_elapsed_ms = Some(elapsed_ms.max(0));
        record.manual_override = false;
        record.flag = FinishFlag::None;
        record.status()
    }

    /// Flag a runner. Any captured time is kept but no longer ranks.
    pub fn set_flag(&mut self, member_number: MemberNumber, flag: FinishFlag) -> RunnerStatus {
        let record = self.entry(member_number);
        record.flag = flag;
        record.status()
    }

    /// Replace the time with a manually entered one, floored to whole seconds
    pub fn edit_time(&mut self, member_number: MemberNumber, minutes: i64, seconds: f64) -> RunnerStatus {
        let whole_secs = minutes.saturating_mul(60).saturating_add(seconds.floor() as i64);
        let record = self.entry(member_number);
        record.finish_elapsed_ms = Some(whole_secs.saturating_mul(MS_PER_SEC).max(0));
        record.manual_override = true;
        record.status()
    }

    /// Drop a record entirely
    pub fn clear(&mut self, member_number: MemberNumber) -> Option<FinishRecord> {
        self.records.remove(&member_number)
    }

    pub fn get(&self, member_number: MemberNumber) -> Option<&FinishRecord> {
        self.records.get(&member_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FinishRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn entry(&mut self, member_number: MemberNumber) -> &mut FinishRecord {
        self.records
            .entry(member_number)
            .or_insert_with(|| FinishRecord::new(member_number))
    }
}

impl From<Vec<FinishRecord>> for FinishRecorder {
    fn from(records: Vec<FinishRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.member_number, r)).collect(),
        }
    }
}

impl From<FinishRecorder> for Vec<FinishRecord> {
    fn from(recorder: FinishRecorder) -> Self {
        recorder.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_capture_replaces_first() {
        let mut recorder = FinishRecorder::new();
        recorder.record_finish(101, 1_500_000);
        let status = recorder.record_finish(101, 1_490_000);

        assert_eq!(status, RunnerStatus::Finished);
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.get(101).unwrap().finish_elapsed_ms, Some(1_490_000));
    }

    #[test]
    fn flag_needs_no_time_and_finish_clears_it() {
        let mut recorder = FinishRecorder::new();
        assert_eq!(recorder.set_flag(102, FinishFlag::Dnf), RunnerStatus::Dnf);
        assert_eq!(recorder.get(102).unwrap().finish_elapsed_ms, None);

        let status = recorder.record_finish(102, 1_600_000);
        assert_eq!(status, RunnerStatus::Finished);
        assert_eq!(recorder.get(102).unwrap().flag, FinishFlag::None);
    }

    #[test]
    fn early_start_keeps_time_but_does_not_rank() {
        let mut recorder = FinishRecorder::new();
        recorder.record_finish(103, 80_000);
        let status = recorder.set_flag(103, FinishFlag::EarlyStart);

        let record = recorder.get(103).unwrap();
        assert_eq!(status, RunnerStatus::EarlyStart);
        assert_eq!(record.finish_elapsed_ms, Some(80_000));
        assert_eq!(record.ranked_time_ms(), None);
    }

    #[test]
    fn clearing_a_flag_restores_the_timed_status() {
        let mut recorder = FinishRecorder::new();
        recorder.set_flag(104, FinishFlag::Dnf);
        assert_eq!(recorder.set_flag(104, FinishFlag::None), RunnerStatus::Racing);

        recorder.record_finish(104, 1_000);
        recorder.set_flag(104, FinishFlag::Dnf);
        assert_eq!(recorder.set_flag(104, FinishFlag::None), RunnerStatus::Finished);
    }

    #[test]
    fn edit_time_floors_and_marks_override() {
        let mut recorder = FinishRecorder::new();
        recorder.record_finish(105, 1_234_567);
        recorder.edit_time(105, 25, 30.9);

        let record = recorder.get(105).unwrap();
        assert!(record.manual_override);
        assert_eq!(record.finish_elapsed_ms, Some(1_530_000));
        assert_eq!(record.finish_time().as_deref(), Some("25:30"));

        // A fresh capture drops the override marker
        recorder.record_finish(105, 1_531_000);
        assert!(!recorder.get(105).unwrap().manual_override);
    }

    #[test]
    fn edit_time_clamps_at_zero() {
        let mut recorder = FinishRecorder::new();
        recorder.edit_time(106, 0, -12.0);
        assert_eq!(recorder.get(106).unwrap().finish_elapsed_ms, Some(0));

        recorder.edit_time(106, -3, 10.0);
        assert_eq!(recorder.get(106).unwrap().finish_elapsed_ms, Some(0));
    }

    #[test]
    fn clear_removes_record() {
        let mut recorder = FinishRecorder::new();
        recorder.record_finish(107, 5_000);
        assert!(recorder.clear(107).is_some());
        assert!(recorder.get(107).is_none());
        assert!(recorder.is_empty());
    }
}
