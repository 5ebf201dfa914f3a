//! Authoritative race-elapsed clock
//!
//! Elapsed time is banked whenever the clock pauses, so pause/resume never
//! loses or repeats time. In testing mode the clock runs at a multiple of
//! real time for rehearsals. A [`ClockSnapshot`] carries the clock across a
//! save and reload.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clock state as stored with the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub elapsed_ms: i64,
    pub speed: u32,
    pub running: bool,

    /// Wall-clock time the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RaceClock {
    /// Clock multiplier (1 = real time)
    speed: u32,

    /// When the current running stretch began (system time)
    running_since: Option<Instant>,

    /// Elapsed time accumulated before `running_since`
    banked_ms: i64,
}

impl Default for RaceClock {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RaceClock {
    pub fn new(speed: u32) -> Self {
        Self {
            speed: speed.max(1),
            running_since: None,
            banked_ms: 0,
        }
    }

    /// Running clock that already reads `elapsed_ms` at `now`
    pub fn running_at(elapsed_ms: i64, speed: u32, now: Instant) -> Self {
        let mut clock = Self::new(speed);
        clock.banked_ms = elapsed_ms;
        clock.running_since = Some(now);
        clock
    }

    /// Rebuild a saved clock. A running clock also counts the wall time
    /// since the snapshot, at its own speed; a paused one stays frozen.
    pub fn restore(snapshot: &ClockSnapshot, now_utc: DateTime<Utc>, now: Instant) -> Self {
        if !snapshot.running {
            let mut clock = Self::new(snapshot.speed);
            clock.banked_ms = snapshot.elapsed_ms;
            return clock;
        }
        let away_ms = now_utc
            .signed_duration_since(snapshot.taken_at)
            .num_milliseconds()
            .max(0);
        let elapsed_ms = snapshot
            .elapsed_ms
            .saturating_add(away_ms.saturating_mul(snapshot.speed.max(1) as i64));
        Self::running_at(elapsed_ms, snapshot.speed, now)
    }

    pub fn snapshot(&self, now: Instant, now_utc: DateTime<Utc>) -> ClockSnapshot {
        ClockSnapshot {
            elapsed_ms: self.elapsed_ms(now),
            speed: self.speed,
            running: self.is_running(),
            taken_at: now_utc,
        }
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Start or resume. Does nothing if already running.
    pub fn start(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Freeze elapsed time. Does nothing if already paused.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.banked_ms = self.banked_ms.saturating_add(self.scaled_ms(since, now));
        }
    }

    pub fn elapsed_ms(&self, now: Instant) -> i64 {
        match self.running_since {
            Some(since) => self.banked_ms.saturating_add(self.scaled_ms(since, now)),
            None => self.banked_ms,
        }
    }

    fn scaled_ms(&self, since: Instant, now: Instant) -> i64 {
        let real_ms = now.saturating_duration_since(since).as_millis() as i64;
        real_ms.saturating_mul(self.speed as i64)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn stopped_clock_reads_zero() {
        let clock = RaceClock::default();
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed_ms(Instant::now()), 0);
    }

    #[test]
    fn runs_in_real_time() {
        let t0 = Instant::now();
        let mut clock = RaceClock::default();
        clock.start(t0);
        assert_eq!(clock.elapsed_ms(t0 + Duration::from_millis(1_500)), 1_500);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let t0 = Instant::now();
        let mut clock = RaceClock::default();
        clock.start(t0);
        clock.pause(t0 + Duration::from_secs(10));

        assert!(!clock.is_running());
        assert_eq!(clock.elapsed_ms(t0 + Duration::from_secs(60)), 10_000);

        clock.start(t0 + Duration::from_secs(60));
        assert_eq!(clock.elapsed_ms(t0 + Duration::from_secs(65)), 15_000);

        // Repeated start/pause calls are idempotent
        clock.start(t0 + Duration::from_secs(70));
        clock.pause(t0 + Duration::from_secs(70));
        clock.pause(t0 + Duration::from_secs(90));
        assert_eq!(clock.elapsed_ms(t0 + Duration::from_secs(100)), 20_000);
    }

    #[test]
    fn testing_speed_accelerates() {
        let t0 = Instant::now();
        let mut clock = RaceClock::new(10);
        clock.start(t0);
        assert_eq!(clock.elapsed_ms(t0 + Duration::from_millis(100)), 1_000);
        assert_eq!(RaceClock::new(0).speed(), 1);
    }

    #[test]
    fn snapshot_of_testing_clock_keeps_speed_and_time() {
        let u0 = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let t0 = Instant::now();
        let mut clock = RaceClock::new(10);
        clock.start(t0);

        let snapshot = clock.snapshot(t0 + Duration::from_secs(30), u0 + chrono::Duration::seconds(30));
        assert_eq!(snapshot.elapsed_ms, 300_000);

        // Reloaded two wall-clock seconds later
        let t1 = Instant::now();
        let restored = RaceClock::restore(&snapshot, u0 + chrono::Duration::seconds(32), t1);
        assert_eq!(restored.speed(), 10);
        assert!(restored.is_running());
        assert_eq!(restored.elapsed_ms(t1), 320_000);
        assert_eq!(restored.elapsed_ms(t1 + Duration::from_secs(1)), 330_000);
    }

    #[test]
    fn paused_snapshot_stays_frozen() {
        let u0 = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let t0 = Instant::now();
        let mut clock = RaceClock::default();
        clock.start(t0);
        clock.pause(t0 + Duration::from_secs(10));

        let snapshot = clock.snapshot(t0 + Duration::from_secs(70), u0 + chrono::Duration::seconds(70));
        assert!(!snapshot.running);

        let t1 = Instant::now();
        let restored = RaceClock::restore(&snapshot, u0 + chrono::Duration::seconds(600), t1);
        assert!(!restored.is_running());
        assert_eq!(restored.elapsed_ms(t1 + Duration::from_secs(60)), 10_000);
    }

    #[test]
    fn running_clock_starts_from_given_elapsed() {
        let t0 = Instant::now();
        let clock = RaceClock::running_at(95_000, 1, t0);
        assert!(clock.is_running());
        assert_eq!(clock.elapsed_ms(t0 + Duration::from_millis(500)), 95_500);
    }
}
