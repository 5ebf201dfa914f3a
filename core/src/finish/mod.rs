//! Finish capture
//!
//! Records finish times against race-elapsed milliseconds, supports manual
//! correction by the race director and the DNF / early-start flags.

mod recorder;

pub use recorder::{FinishFlag, FinishRecord, FinishRecorder};
