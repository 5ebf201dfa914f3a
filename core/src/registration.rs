//! Temporary bib numbers for runners registering on race day
//!
//! Numbers count down from 999 so they stay clear of the club's member
//! numbers. The issuer does not look at the roster; the race skips any
//! number a runner already holds.

use serde::{Deserialize, Serialize};

use crate::race::MemberNumber;

pub const FIRST_TEMP_NUMBER: MemberNumber = 999;

/// Number following `last_issued` (999 when nothing has been issued yet).
/// `None` once the sequence is exhausted.
pub fn next_temp_number(last_issued: Option<MemberNumber>) -> Option<MemberNumber> {
    match last_issued {
        None => Some(FIRST_TEMP_NUMBER),
        Some(last) => last.checked_sub(1).filter(|n| *n > 0),
    }
}

/// Per-race issuance counter, persisted with the race
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempNumberIssuer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_issued: Option<MemberNumber>,
}

impl TempNumberIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next number, or `None` when exhausted
    pub fn issue(&mut self) -> Option<MemberNumber> {
        let next = next_temp_number(self.last_issued)?;
        self.last_issued = Some(next);
        Some(next)
    }

    /// The number the next `issue` call would return
    pub fn peek(&self) -> Option<MemberNumber> {
        next_temp_number(self.last_issued)
    }

    pub fn last_issued(&self) -> Option<MemberNumber> {
        self.last_issued
    }
}
