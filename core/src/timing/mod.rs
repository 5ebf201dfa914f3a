//! Time text handling
//!
//! Handicaps and durations travel as `MM:SS` text (minutes unbounded,
//! seconds 0-59) and are worked with internally as integer milliseconds.

mod codec;
mod error;
mod handicap;

pub use codec::{
    MS_PER_SEC, format, format_countdown, parse, seconds_to_time, time_to_seconds,
};
pub use error::TimeCodecError;
pub use handicap::Handicap;
