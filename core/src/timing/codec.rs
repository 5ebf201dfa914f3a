//! `MM:SS` text ⇄ millisecond conversion
//!
//! Two roundings are in play:
//! - [`format`] floors to whole seconds (handicaps, finish times)
//! - [`format_countdown`] ceils, so a countdown never shows 0 before the start

use super::TimeCodecError;

pub const MS_PER_SEC: i64 = 1000;

/// Parse `MM:SS` text into milliseconds. Blank text is zero.
pub fn parse(text: &str) -> Result<i64, TimeCodecError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let (minutes, seconds) = text
        .split_once(':')
        .ok_or_else(|| TimeCodecError::MissingColon {
            text: text.to_string(),
        })?;

    let minutes: i64 = minutes.parse().map_err(|_| TimeCodecError::NotNumeric {
        text: text.to_string(),
        part: "minutes",
    })?;
    let seconds: i64 = seconds.parse().map_err(|_| TimeCodecError::NotNumeric {
        text: text.to_string(),
        part: "seconds",
    })?;

    if minutes < 0 || !(0..60).contains(&seconds) {
        return Err(TimeCodecError::OutOfRange {
            text: text.to_string(),
        });
    }

    Ok((minutes * 60 + seconds) * MS_PER_SEC)
}

/// Format milliseconds as zero-padded `MM:SS`, flooring to whole seconds.
/// Anything at or below zero is the short form `0:00`.
pub fn format(ms: i64) -> String {
    if ms <= 0 {
        return "0:00".to_string();
    }
    let total_secs = ms / MS_PER_SEC;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format a remaining duration for countdown display, rounding up.
///
/// Under a minute shows seconds only (`30s`), otherwise `M:SS`.
pub fn format_countdown(ms: i64) -> String {
    let secs = if ms <= 0 {
        0
    } else {
        (ms + MS_PER_SEC - 1) / MS_PER_SEC
    };

    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Whole seconds in `MM:SS` text
pub fn time_to_seconds(text: &str) -> Result<i64, TimeCodecError> {
    Ok(parse(text)? / MS_PER_SEC)
}

/// `MM:SS` text for whole seconds, floored at `0:00`
pub fn seconds_to_time(secs: i64) -> String {
    format(secs.max(0) * MS_PER_SEC)
}
