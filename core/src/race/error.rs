//! Error types for race state transitions

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{Distance, MemberNumber, RaceStatus};

/// Operations the race state machine refuses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaceError {
    #[error("cannot move race from {from} to {to}")]
    InvalidTransition { from: RaceStatus, to: RaceStatus },

    #[error("race is {status}; finishes can only be recorded while it is active")]
    NotActive { status: RaceStatus },

    #[error("race already started at {start_time}")]
    AlreadyStarted { start_time: DateTime<Utc> },

    #[error("race is {status} and not accepting check-ins")]
    NotAcceptingCheckins { status: RaceStatus },

    #[error("race is {status}; the roster can no longer change")]
    RosterClosed { status: RaceStatus },

    #[error("no runner with member number {member_number}")]
    UnknownRunner { member_number: MemberNumber },

    #[error("runner {member_number} has not checked in")]
    NotCheckedIn { member_number: MemberNumber },

    #[error("member number {member_number} is already in the roster")]
    DuplicateMember { member_number: MemberNumber },

    #[error("the {distance} race is not running today")]
    DistanceInactive { distance: Distance },

    #[error("finish time for {member_number} is negative ({elapsed_ms} ms)")]
    NegativeFinishTime {
        member_number: MemberNumber,
        elapsed_ms: i64,
    },

    #[error("temporary race numbers are exhausted")]
    TempNumbersExhausted,
}
