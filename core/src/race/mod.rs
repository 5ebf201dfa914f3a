//! Race aggregate
//!
//! This module provides:
//! - **Runners**: roster entries with per-distance handicaps
//! - **Race**: the roster plus the setup → checkin → active → finished state
//!   machine that gates check-in, finishes and results

mod error;
mod runner;
mod state;


pub use error::RaceError;
pub use runner::{Distance, MemberNumber, Membership, Runner, RunnerStatus};
pub use state::{Race, RaceStatus};
