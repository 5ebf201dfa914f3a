//! Handicap recalculation

mod engine;

pub use engine::{HandicapEngine, reference_finish_ms};
