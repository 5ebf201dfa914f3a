//! Shared configuration types for stagger
//!
//! This crate contains serializable configuration types that are shared between
//! the race engine (stagger-core) and any front end that edits settings.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Alert Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Start-alert behaviour for the "go" signal fired ahead of each cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Master enable for start alerts
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How long before a cohort's start the alert fires (ms)
    #[serde(default = "default_lead_ms")]
    pub lead_ms: i64,

    /// Width of the trigger band ending at `lead_ms` (ms)
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,

    /// How long a fallback visual alert stays on screen (ms)
    #[serde(default = "default_visual_clear_ms")]
    pub visual_clear_ms: u64,

    /// Triggered cohorts are forgotten this long after their start (ms)
    #[serde(default = "default_retain_ms")]
    pub retain_ms: i64,

    /// Vibration pulse pattern in ms (on, off, on, ...)
    #[serde(default = "default_vibration_pattern")]
    pub vibration_pattern: Vec<u32>,
}

impl AlertSettings {
    /// Lower (exclusive) edge of the trigger band
    pub fn window_floor_ms(&self) -> i64 {
        self.lead_ms - self.window_ms
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_ms: default_lead_ms(),
            window_ms: default_window_ms(),
            visual_clear_ms: default_visual_clear_ms(),
            retain_ms: default_retain_ms(),
            vibration_pattern: default_vibration_pattern(),
        }
    }
}

fn default_lead_ms() -> i64 {
    4000
}

fn default_window_ms() -> i64 {
    500
}

fn default_visual_clear_ms() -> u64 {
    4000
}

fn default_retain_ms() -> i64 {
    10_000
}

fn default_vibration_pattern() -> Vec<u32> {
    vec![200, 100, 200]
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Tick cadence of the race clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSettings {
    /// Real-time tick interval (ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Tick interval while rehearsing in testing mode (ms)
    #[serde(default = "default_testing_tick_interval_ms")]
    pub testing_tick_interval_ms: u64,

    /// Clock multiplier applied in testing mode
    #[serde(default = "default_testing_speed")]
    pub testing_speed: u32,
}

impl ClockSettings {
    /// Tick interval and clock multiplier for the given mode
    pub fn cadence(&self, testing_mode: bool) -> (u64, u32) {
        if testing_mode {
            (self.testing_tick_interval_ms, self.testing_speed.max(1))
        } else {
            (self.tick_interval_ms, 1)
        }
    }
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            testing_tick_interval_ms: default_testing_tick_interval_ms(),
            testing_speed: default_testing_speed(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_testing_tick_interval_ms() -> u64 {
    10
}

fn default_testing_speed() -> u32 {
    10
}

// ─────────────────────────────────────────────────────────────────────────────
// Handicap Policy
// ─────────────────────────────────────────────────────────────────────────────

/// How finish margins translate into handicap adjustments.
///
/// The margin is the runner's lead over the distance's reference finish
/// (positive = ahead). It is scaled by `damping_percent`, clamped to the
/// increase/decrease limits and truncated onto the `increment_secs` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandicapPolicy {
    /// Adjustment granularity (seconds)
    #[serde(default = "default_increment_secs")]
    pub increment_secs: u32,

    /// Share of the margin applied to the handicap (0-100)
    #[serde(default = "default_damping_percent")]
    pub damping_percent: u32,

    /// Largest single-race increase (seconds)
    #[serde(default = "default_max_adjust_secs")]
    pub max_increase_secs: u32,

    /// Largest single-race decrease (seconds)
    #[serde(default = "default_max_adjust_secs")]
    pub max_decrease_secs: u32,
}

impl Default for HandicapPolicy {
    fn default() -> Self {
        Self {
            increment_secs: default_increment_secs(),
            damping_percent: default_damping_percent(),
            max_increase_secs: default_max_adjust_secs(),
            max_decrease_secs: default_max_adjust_secs(),
        }
    }
}

fn default_increment_secs() -> u32 {
    5
}

fn default_damping_percent() -> u32 {
    50
}

fn default_max_adjust_secs() -> u32 {
    60
}

// ─────────────────────────────────────────────────────────────────────────────
// Championship Points
// ─────────────────────────────────────────────────────────────────────────────

/// Position-indexed championship points for eligible members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsTable {
    /// Points for 1st, 2nd, 3rd, ...
    #[serde(default = "default_points_by_position")]
    pub by_position: Vec<u32>,

    /// Points for any placing past the end of `by_position`
    #[serde(default = "default_participation_points")]
    pub participation: u32,
}

impl PointsTable {
    /// Points for a 1-based position
    pub fn points_for(&self, position: u32) -> u32 {
        if position == 0 {
            return 0;
        }
        self.by_position
            .get(position as usize - 1)
            .copied()
            .unwrap_or(self.participation)
    }
}

impl Default for PointsTable {
    fn default() -> Self {
        Self {
            by_position: default_points_by_position(),
            participation: default_participation_points(),
        }
    }
}

fn default_points_by_position() -> Vec<u32> {
    vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]
}

fn default_participation_points() -> u32 {
    1
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level persisted settings.
///
/// Persistence methods (load/save) are provided by stagger-core via the
/// `AppConfigExt` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding saved races (empty = platform default)
    #[serde(default)]
    pub data_directory: String,

    /// Run the clock accelerated for rehearsals
    #[serde(default)]
    pub testing_mode: bool,

    #[serde(default)]
    pub alerts: AlertSettings,

    #[serde(default)]
    pub clock: ClockSettings,

    #[serde(default)]
    pub handicap: HandicapPolicy,

    #[serde(default)]
    pub points: PointsTable,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.alerts.lead_ms, 4000);
        assert_eq!(config.alerts.window_floor_ms(), 3500);
        assert_eq!(config.handicap.increment_secs, 5);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: AppConfig = toml::from_str("[alerts]\nenabled = false\n").unwrap();
        assert!(!config.alerts.enabled);
        assert_eq!(config.alerts.retain_ms, 10_000);
        assert_eq!(config.alerts.vibration_pattern, vec![200, 100, 200]);
    }

    #[test]
    fn points_past_table_fall_back_to_participation() {
        let table = PointsTable::default();
        assert_eq!(table.points_for(1), 10);
        assert_eq!(table.points_for(10), 1);
        assert_eq!(table.points_for(11), 1);
        assert_eq!(table.points_for(0), 0);

        let table = PointsTable {
            by_position: vec![5, 3],
            participation: 0,
        };
        assert_eq!(table.points_for(3), 0);
    }

    #[test]
    fn testing_mode_cadence() {
        let clock = ClockSettings::default();
        assert_eq!(clock.cadence(false), (100, 1));
        assert_eq!(clock.cadence(true), (10, 10));
    }
}
