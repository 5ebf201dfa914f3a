//! Transient on-screen alerts shown when audio fails

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Board shared between the alert service (writer) and the UI (reader)
pub type SharedAlertBoard = Arc<RwLock<VisualAlertBoard>>;

/// A visual alert naming a cohort's runners
#[derive(Debug, Clone)]
pub struct VisualAlert {
    pub start_offset_ms: i64,
    pub text: String,

    /// When the alert went up (system time)
    pub raised_at: Instant,

    pub clear_after: Duration,
}

impl VisualAlert {
    pub fn new(start_offset_ms: i64, text: String, raised_at: Instant, clear_after: Duration) -> Self {
        Self {
            start_offset_ms,
            text,
            raised_at,
            clear_after,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.clear_after
    }
}

/// Currently displayed visual alerts
#[derive(Debug, Default)]
pub struct VisualAlertBoard {
    alerts: Vec<VisualAlert>,
}

impl VisualAlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedAlertBoard {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Put an alert up, replacing any earlier one for the same cohort
    pub fn raise(&mut self, alert: VisualAlert) {
        self.alerts
            .retain(|a| a.start_offset_ms != alert.start_offset_ms);
        self.alerts.push(alert);
    }

    /// Drop expired alerts and return what is still showing
    pub fn active(&mut self, now: Instant) -> &[VisualAlert] {
        self.alerts.retain(|a| !a.is_expired(now));
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
