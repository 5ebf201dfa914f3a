//! Per-distance placings
//!
//! Finishers are ordered by finish time on the shared race clock (first
//! across the line wins a handicap race). Ties fall back to roster order,
//! which is check-in order. DNF, early-start and untimed runners stay in
//! the report without a position.

use serde::Serialize;
use stagger_types::PointsTable;

use crate::finish::FinishRecorder;
use crate::handicap::{HandicapEngine, reference_finish_ms};
use crate::race::{Distance, MemberNumber, Runner, RunnerStatus};
use crate::timing::{self, Handicap};

/// One runner's line in the results report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandicapResult {
    /// 1-based, `None` for runners who do not place
    pub position: Option<u32>,
    pub member_number: MemberNumber,
    pub full_name: String,
    pub distance: Distance,
    pub status: RunnerStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<String>,

    pub old_handicap: Handicap,
    pub new_handicap: Handicap,
    pub points_earned: u32,
}

/// Results for one distance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceResults {
    pub distance: Distance,

    /// Median finish the handicap margins were measured against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_finish_ms: Option<i64>,

    /// Placed runners first, then the rest in roster order
    pub rows: Vec<HandicapResult>,
}

impl DistanceResults {
    pub fn placed(&self) -> impl Iterator<Item = &HandicapResult> {
        self.rows.iter().filter(|r| r.position.is_some())
    }
}

/// Builds the results report from a roster and its finish records
#[derive(Debug, Clone, Default)]
pub struct ResultsRanker {
    points: PointsTable,
    engine: HandicapEngine,
}

impl ResultsRanker {
    pub fn new(points: PointsTable, engine: HandicapEngine) -> Self {
        Self { points, engine }
    }

    /// Rank every checked-in runner, 5km before 10km. Distances with no
    /// checked-in runners are left out.
    pub fn rank(&self, runners: &[Runner], finishes: &FinishRecorder) -> Vec<DistanceResults> {
        Distance::ALL
            .into_iter()
            .filter_map(|distance| self.rank_distance(distance, runners, finishes))
            .collect()
    }

    fn rank_distance(
        &self,
        distance: Distance,
        runners: &[Runner],
        finishes: &FinishRecorder,
    ) -> Option<DistanceResults> {
        let entrants: Vec<&Runner> = runners
            .iter()
            .filter(|r| r.checked_in && r.distance == distance)
            .collect();
        if entrants.is_empty() {
            return None;
        }

        // (finish ms, roster index) for runners who place
        let mut timed: Vec<(i64, usize)> = entrants
            .iter()
            .enumerate()
            .filter_map(|(idx, r)| {
                finishes
                    .get(r.member_number)
                    .and_then(|rec| rec.ranked_time_ms())
                    .map(|ms| (ms, idx))
            })
            .collect();
        timed.sort_unstable();

        let times: Vec<i64> = timed.iter().map(|(ms, _)| *ms).collect();
        let reference = reference_finish_ms(&times);

        let mut rows = Vec::with_capacity(entrants.len());
        for (place, &(finish_ms, idx)) in timed.iter().enumerate() {
            let runner = entrants[idx];
            let position = place as u32 + 1;
            let points = if runner.membership.earns_points() {
                self.points.points_for(position)
            } else {
                0
            };
            let new_handicap = match reference {
                Some(reference) => self.engine.new_handicap(runner.handicap(), finish_ms, reference),
                None => runner.handicap(),
            };

            rows.push(HandicapResult {
                position: Some(position),
                member_number: runner.member_number,
                full_name: runner.full_name.clone(),
                distance,
                status: RunnerStatus::Finished,
                finish_time: Some(timing::format(finish_ms)),
                old_handicap: runner.handicap(),
                new_handicap,
                points_earned: points,
            });
        }

        // Everyone else keeps their handicap and scores nothing
        for (idx, runner) in entrants.iter().enumerate() {
            if timed.iter().any(|&(_, placed)| placed == idx) {
                continue;
            }
            let record = finishes.get(runner.member_number);
            rows.push(HandicapResult {
                position: None,
                member_number: runner.member_number,
                full_name: runner.full_name.clone(),
                distance,
                status: record
                    .map(|r| r.status())
                    .filter(|s| *s != RunnerStatus::Racing)
                    .unwrap_or(RunnerStatus::Dnf),
                finish_time: record.and_then(|r| r.finish_time()),
                old_handicap: runner.handicap(),
                new_handicap: runner.handicap(),
                points_earned: 0,
            });
        }

        Some(DistanceResults {
            distance,
            reference_finish_ms: reference,
            rows,
        })
    }
}
