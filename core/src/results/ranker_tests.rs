//! Tests for results ranking, points and handicap carry-over

use chrono::{NaiveDate, TimeZone, Utc};
use stagger_types::PointsTable;

use crate::finish::FinishFlag;
use crate::handicap::HandicapEngine;
use crate::race::{Distance, Membership, Race, Runner, RunnerStatus};

use super::{DistanceResults, ResultsRanker};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn entrant(member: u32, name: &str, distance: Distance, handicap: &str, membership: Membership) -> Runner {
    Runner::new(member, name, distance)
        .with_handicap(handicap.parse().unwrap())
        .with_membership(membership)
}

/// Active race with six runners checked in in member-number order
fn make_race() -> Race {
    let mut race = Race::new("club", NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    for runner in [
        entrant(101, "Alex", Distance::FiveK, "01:30", Membership::Financial),
        entrant(102, "Blair", Distance::FiveK, "02:00", Membership::Casual),
        entrant(103, "Casey", Distance::TenK, "03:30", Membership::Financial),
        entrant(104, "Dana", Distance::FiveK, "01:00", Membership::Provisional),
        entrant(105, "Eli", Distance::FiveK, "00:30", Membership::Financial),
        entrant(106, "Fran", Distance::TenK, "03:30", Membership::Financial),
    ] {
        race.add_runner(runner).unwrap();
    }
    race.open_checkin().unwrap();
    for member in 101..=106 {
        race.check_in(member).unwrap();
    }
    race.start(Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap())
        .unwrap();
    race
}

/// 102 first, 101 and 104 tied, 105 DNF; 103 wins 10km, 106 started early
fn finished_race() -> Race {
    let mut race = make_race();
    race.record_finish(101, 1_500_000).unwrap();
    race.record_finish(102, 1_490_000).unwrap();
    race.record_finish(104, 1_500_000).unwrap();
    race.set_flag(105, FinishFlag::Dnf).unwrap();
    race.record_finish(103, 3_000_000).unwrap();
    race.record_finish(106, 2_900_000).unwrap();
    race.set_flag(106, FinishFlag::EarlyStart).unwrap();
    race
}

fn rank(race: &Race) -> Vec<DistanceResults> {
    ResultsRanker::default().rank(race.runners(), race.finishes())
}

fn members(results: &DistanceResults) -> Vec<(Option<u32>, u32)> {
    results
        .rows
        .iter()
        .map(|r| (r.position, r.member_number))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Placings
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn placings_per_distance_with_roster_order_tie_break() {
    let race = finished_race();
    let results = rank(&race);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].distance, Distance::FiveK);
    assert_eq!(
        members(&results[0]),
        vec![(Some(1), 102), (Some(2), 101), (Some(3), 104), (None, 105)]
    );
    assert_eq!(results[1].distance, Distance::TenK);
    assert_eq!(members(&results[1]), vec![(Some(1), 103), (None, 106)]);
}

#[test]
fn tie_break_follows_check_in_order_not_member_number() {
    let mut race = Race::new("club", NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    race.add_runner(entrant(1, "First", Distance::FiveK, "", Membership::Casual)).unwrap();
    race.add_runner(entrant(2, "Second", Distance::FiveK, "", Membership::Casual)).unwrap();
    race.open_checkin().unwrap();
    race.check_in(2).unwrap();
    race.check_in(1).unwrap();
    race.start(Utc::now()).unwrap();
    race.record_finish(1, 1_000_000).unwrap();
    race.record_finish(2, 1_000_000).unwrap();

    let results = rank(&race);
    assert_eq!(members(&results[0]), vec![(Some(1), 2), (Some(2), 1)]);
}

#[test]
fn unplaced_rows_keep_status_and_time() {
    let race = finished_race();
    let results = rank(&race);

    let eli = &results[0].rows[3];
    assert_eq!(eli.status, RunnerStatus::Dnf);
    assert_eq!(eli.finish_time, None);
    assert_eq!(eli.points_earned, 0);

    let fran = &results[1].rows[1];
    assert_eq!(fran.status, RunnerStatus::EarlyStart);
    assert_eq!(fran.finish_time.as_deref(), Some("48:20"));
    assert_eq!(fran.new_handicap, fran.old_handicap);
}

#[test]
fn checked_in_runner_without_a_record_reports_as_dnf() {
    let mut race = make_race();
    race.record_finish(101, 1_500_000).unwrap();

    let results = rank(&race);
    let blair = results[0].rows.iter().find(|r| r.member_number == 102).unwrap();
    assert_eq!(blair.position, None);
    assert_eq!(blair.status, RunnerStatus::Dnf);
}

#[test]
fn distance_without_entrants_is_omitted() {
    let mut race = Race::new("club", NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    race.add_runner(entrant(1, "Only", Distance::TenK, "01:00", Membership::Financial)).unwrap();
    race.add_runner(entrant(2, "Absent", Distance::FiveK, "01:00", Membership::Financial)).unwrap();
    race.open_checkin().unwrap();
    race.check_in(1).unwrap();
    race.start(Utc::now()).unwrap();

    let results = rank(&race);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].distance, Distance::TenK);
    assert_eq!(results[0].reference_finish_ms, None);
}

// ═══════════════════════════════════════════════════════════════════════════
// Points
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn casual_runners_score_nothing() {
    let race = finished_race();
    let results = rank(&race);

    let points: Vec<_> = results[0].placed().map(|r| r.points_earned).collect();
    // 102 is casual, 101 financial, 104 provisional
    assert_eq!(points, vec![0, 9, 8]);
    assert_eq!(results[1].rows[0].points_earned, 10);
}

#[test]
fn points_table_is_configurable() {
    let race = finished_race();
    let ranker = ResultsRanker::new(
        PointsTable {
            by_position: vec![25, 18],
            participation: 2,
        },
        HandicapEngine::default(),
    );
    let results = ranker.rank(race.runners(), race.finishes());

    let points: Vec<_> = results[0].placed().map(|r| r.points_earned).collect();
    assert_eq!(points, vec![0, 18, 2]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Handicaps
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn handicaps_move_against_the_median_finish() {
    let race = finished_race();
    let results = rank(&race);

    assert_eq!(results[0].reference_finish_ms, Some(1_500_000));
    let rows: Vec<_> = results[0]
        .rows
        .iter()
        .map(|r| (r.member_number, r.old_handicap.to_string(), r.new_handicap.to_string()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (102, "02:00".to_string(), "02:05".to_string()),
            (101, "01:30".to_string(), "01:30".to_string()),
            (104, "01:00".to_string(), "01:00".to_string()),
            (105, "00:30".to_string(), "00:30".to_string()),
        ]
    );
}

#[test]
fn new_handicaps_carry_onto_the_roster_after_finalizing() {
    let mut race = finished_race();
    let results = rank(&race);

    assert!(race.apply_results(&results).is_err());

    race.finish().unwrap();
    assert_eq!(race.apply_results(&results), Ok(1));
    assert_eq!(race.runner(102).unwrap().handicap().to_string(), "02:05");
}

#[test]
fn report_serializes_handicaps_as_text() {
    let race = finished_race();
    let results = rank(&race);
    let text = toml::to_string(&results[0].rows[0]).unwrap();
    assert!(text.contains("new_handicap = \"02:05\""));
    assert!(text.contains("position = 1"));
}
