//! Start group scheduling
//!
//! Runners sharing a handicap start together. The schedule is a projection
//! rebuilt from the roster on every tick, so arbitrary jumps in elapsed
//! time (testing mode, pause/resume) never leave stale state behind.

mod cohort;
mod scheduler;


pub use cohort::{CohortMember, StartGroup};
pub use scheduler::{
    ALL_STARTED_MESSAGE, ProjectionMode, STARTING_WINDOW_MS, Schedule, VISIBLE_AFTER_START_MS,
    project_cohorts,
};
