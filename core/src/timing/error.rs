//! Error types for time text parsing

use thiserror::Error;

/// Malformed `MM:SS` text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeCodecError {
    #[error("'{text}' is not MM:SS (missing ':')")]
    MissingColon { text: String },

    #[error("'{text}' is not MM:SS (non-numeric {part})")]
    NotNumeric { text: String, part: &'static str },

    #[error("'{text}' is out of range (seconds must be 0-59, minutes non-negative)")]
    OutOfRange { text: String },
}
