//! Alert delivery service
//!
//! Runs in a background task, receiving `AlertRequest`s via channel. Each
//! request is delivered on its own task so a slow or hung audio device
//! never holds up the next cohort. Failed playback is handled once through
//! the visual/vibration fallback; there are no retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stagger_types::AlertSettings;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{AlertCapability, AlertRequest, Delivery, SharedAlertBoard, VisualAlert, Vibrator};

/// Sender handle for alert requests
pub type AlertSender = mpsc::Sender<AlertRequest>;

/// Create a new alert channel
pub fn create_alert_channel() -> (AlertSender, mpsc::Receiver<AlertRequest>) {
    // A race has at most a few dozen cohorts
    mpsc::channel(64)
}

/// Delivers start alerts through the injected capabilities
#[derive(Clone)]
pub struct AlertService {
    capability: Arc<dyn AlertCapability>,
    vibrator: Arc<dyn Vibrator>,
    board: SharedAlertBoard,
    settings: AlertSettings,
}

impl AlertService {
    pub fn new(
        capability: Arc<dyn AlertCapability>,
        vibrator: Arc<dyn Vibrator>,
        board: SharedAlertBoard,
        settings: AlertSettings,
    ) -> Self {
        Self {
            capability,
            vibrator,
            board,
            settings,
        }
    }

    /// Run until every sender is dropped
    pub async fn run(self, mut request_rx: mpsc::Receiver<AlertRequest>) {
        while let Some(request) = request_rx.recv().await {
            let service = self.clone();
            tokio::spawn(async move {
                service.deliver(request).await;
            });
        }
        debug!("Alert channel closed");
    }

    /// Try audio, fall back to a visual alert plus vibration
    pub async fn deliver(&self, request: AlertRequest) -> Delivery {
        if self.play_audio().await {
            debug!(start_offset_ms = request.start_offset_ms, "Start alert played");
            return Delivery::Audio;
        }

        warn!(
            start_offset_ms = request.start_offset_ms,
            label = %request.label,
            "Audio alert failed, showing visual alert"
        );

        let alert = VisualAlert::new(
            request.start_offset_ms,
            request.message(),
            Instant::now(),
            Duration::from_millis(self.settings.visual_clear_ms),
        );
        self.board.write().await.raise(alert);

        let vibrated = self.vibrator.vibrate(&self.settings.vibration_pattern);
        Delivery::Fallback { vibrated }
    }

    async fn play_audio(&self) -> bool {
        if !self.capability.is_ready() {
            return false;
        }
        let capability = Arc::clone(&self.capability);
        match tokio::task::spawn_blocking(move || capability.attempt_play()).await {
            Ok(played) => played,
            Err(e) => {
                warn!(error = %e, "Audio playback task failed");
                false
            }
        }
    }
}
