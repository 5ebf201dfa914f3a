//! Results and championship points
//!
//! Turns the finish records into the per-distance report: placings,
//! points and the recalculated handicaps.

mod ranker;

#[cfg(test)]
mod ranker_tests;

pub use ranker::{DistanceResults, HandicapResult, ResultsRanker};
