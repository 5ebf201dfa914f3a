//! Runner roster entries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::timing::Handicap;

/// Bib / membership number, unique within a race
pub type MemberNumber = u32;

/// Race distance category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Distance {
    #[serde(rename = "5km")]
    FiveK,
    #[serde(rename = "10km")]
    TenK,
}

impl Distance {
    pub const ALL: [Distance; 2] = [Distance::FiveK, Distance::TenK];

    pub fn label(self) -> &'static str {
        match self {
            Distance::FiveK => "5km",
            Distance::TenK => "10km",
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Distance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5km" | "5k" | "5" => Ok(Distance::FiveK),
            "10km" | "10k" | "10" => Ok(Distance::TenK),
            other => Err(format!("unknown distance '{other}' (expected 5km or 10km)")),
        }
    }
}

/// Where a runner is in the race lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerStatus {
    #[default]
    NotStarted,
    Racing,
    Finished,
    Dnf,
    EarlyStart,
}

impl fmt::Display for RunnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunnerStatus::NotStarted => "not started",
            RunnerStatus::Racing => "racing",
            RunnerStatus::Finished => "finished",
            RunnerStatus::Dnf => "DNF",
            RunnerStatus::EarlyStart => "early start",
        })
    }
}

/// Club membership standing, which decides championship eligibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Financial,
    Provisional,
    #[default]
    Casual,
}

impl Membership {
    /// Casual runners never score championship points
    pub fn earns_points(self) -> bool {
        !matches!(self, Membership::Casual)
    }
}

impl FromStr for Membership {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "financial" | "official" => Ok(Membership::Financial),
            "provisional" => Ok(Membership::Provisional),
            "casual" => Ok(Membership::Casual),
            other => Err(format!("unknown membership '{other}'")),
        }
    }
}

/// A runner entered in a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub member_number: MemberNumber,
    pub full_name: String,
    pub distance: Distance,

    /// Only meaningful when `distance` is 5km
    #[serde(default)]
    pub current_handicap_5k: Handicap,

    /// Only meaningful when `distance` is 10km
    #[serde(default)]
    pub current_handicap_10k: Handicap,

    #[serde(default)]
    pub membership: Membership,

    #[serde(default)]
    pub checked_in: bool,

    #[serde(default)]
    pub status: RunnerStatus,
}

impl Runner {
    pub fn new(member_number: MemberNumber, full_name: impl Into<String>, distance: Distance) -> Self {
        Self {
            member_number,
            full_name: full_name.into(),
            distance,
            current_handicap_5k: Handicap::ZERO,
            current_handicap_10k: Handicap::ZERO,
            membership: Membership::default(),
            checked_in: false,
            status: RunnerStatus::NotStarted,
        }
    }

    /// Set the handicap for the runner's own distance
    pub fn with_handicap(mut self, handicap: Handicap) -> Self {
        self.set_handicap(handicap);
        self
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }

    /// The handicap for the distance this runner is entered in
    pub fn handicap(&self) -> Handicap {
        match self.distance {
            Distance::FiveK => self.current_handicap_5k,
            Distance::TenK => self.current_handicap_10k,
        }
    }

    pub fn set_handicap(&mut self, handicap: Handicap) {
        match self.distance {
            Distance::FiveK => self.current_handicap_5k = handicap,
            Distance::TenK => self.current_handicap_10k = handicap,
        }
    }

    /// Delay after the race start at which this runner's cohort goes
    pub fn start_offset_ms(&self) -> i64 {
        self.handicap().as_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handicap_follows_distance() {
        let mut runner = Runner::new(103, "Casey", Distance::TenK);
        runner.current_handicap_5k = "01:00".parse().unwrap();
        runner.current_handicap_10k = "03:30".parse().unwrap();
        assert_eq!(runner.start_offset_ms(), 210_000);

        runner.distance = Distance::FiveK;
        assert_eq!(runner.start_offset_ms(), 60_000);
    }

    #[test]
    fn blank_handicap_deserializes_to_zero() {
        let runner: Runner = toml::from_str(
            r#"
            member_number = 7
            full_name = "Blank"
            distance = "5km"
            current_handicap_5k = ""
            "#,
        )
        .unwrap();
        assert_eq!(runner.start_offset_ms(), 0);
        assert_eq!(runner.status, RunnerStatus::NotStarted);
        assert_eq!(runner.membership, Membership::Casual);
    }

    #[test]
    fn malformed_handicap_fails_deserialization() {
        let result: Result<Runner, _> = toml::from_str(
            r#"
            member_number = 7
            full_name = "Bad"
            distance = "10km"
            current_handicap_10k = "3m30"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn distance_and_membership_parse_loosely() {
        assert_eq!("10K".parse::<Distance>().unwrap(), Distance::TenK);
        assert_eq!("5km".parse::<Distance>().unwrap(), Distance::FiveK);
        assert!("half".parse::<Distance>().is_err());
        assert!("official".parse::<Membership>().unwrap().earns_points());
        assert!(!Membership::Casual.earns_points());
    }
}
