//! Validated handicap value

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{MS_PER_SEC, TimeCodecError, codec};

/// A runner's start delay, held as whole-second milliseconds.
///
/// Serialized as `MM:SS` text. Blank text is no handicap (offset 0), so an
/// unset handicap and `0:00` behave identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handicap(i64);

impl Handicap {
    pub const ZERO: Handicap = Handicap(0);

    /// Build from milliseconds, flooring to whole seconds and clamping at zero
    pub fn from_ms(ms: i64) -> Self {
        Self((ms.max(0) / MS_PER_SEC) * MS_PER_SEC)
    }

    pub fn from_secs(secs: i64) -> Self {
        Self::from_ms(secs.saturating_mul(MS_PER_SEC))
    }

    pub fn as_ms(self) -> i64 {
        self.0
    }

    pub fn as_secs(self) -> i64 {
        self.0 / MS_PER_SEC
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Handicap {
    type Err = TimeCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::parse(s).map(Self)
    }
}

impl TryFrom<String> for Handicap {
    type Error = TimeCodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Handicap> for String {
    fn from(value: Handicap) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Handicap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::format(self.0))
    }
}
