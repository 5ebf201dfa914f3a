use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use stagger_core::alerts::{NoVibration, create_alert_channel};
use stagger_core::context::{AppConfig, AppConfigExt};
use stagger_core::{
    AlertDispatcher, AlertService, LiveRace, Race, RaceSession, RaceStatus,
    SessionHandle, SharedAlertBoard, SharedRace, TomlRaceStore, VisualAlertBoard,
};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bell::TerminalBell;

/// Background work tied to a running race
#[derive(Default)]
pub struct RaceTasks {
    pub session: Option<SessionHandle>,
    pub alerts: Option<JoinHandle<()>>,
}

impl RaceTasks {
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop();
        }
        if let Some(alerts) = self.alerts.take() {
            alerts.abort();
        }
    }
}

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the core types.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// The loaded race. None until `new` or `load`.
    race: Arc<RwLock<Option<SharedRace>>>,
    pub board: SharedAlertBoard,
    pub tasks: Arc<Mutex<RaceTasks>>,
    pub store: TomlRaceStore,
}

impl CliContext {
    pub fn new() -> Self {
        let config = AppConfig::load();
        let data_dir = config.data_dir().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to ./races for race files");
            PathBuf::from("races")
        });

        Self {
            config: Arc::new(RwLock::new(config)),
            race: Arc::new(RwLock::new(None)),
            board: VisualAlertBoard::shared(),
            tasks: Arc::new(Mutex::new(RaceTasks::default())),
            store: TomlRaceStore::new(data_dir),
        }
    }

    /// Replace the loaded race, stopping anything running for the old one.
    /// An active race picks its clock back up from the saved snapshot.
    pub async fn set_race(&self, race: Race) -> SharedRace {
        self.tasks.lock().await.stop();

        let live = LiveRace::restore(race, Utc::now(), Instant::now());
        let resume = live.race.status() == RaceStatus::Active;
        let testing = live.clock.speed() > 1;

        let handle = Arc::new(RwLock::new(live));
        *self.race.write().await = Some(Arc::clone(&handle));

        if resume {
            self.start_session(testing).await;
        }
        handle
    }

    /// Get the current race handle, or an error for the REPL
    pub async fn race(&self) -> Result<SharedRace, String> {
        self.race
            .read()
            .await
            .clone()
            .ok_or_else(|| "No race loaded. Use `new` or `load` first.".to_string())
    }

    /// Spawn the alert service and the tick loop for the loaded race
    pub async fn start_session(&self, testing: bool) {
        let Ok(race) = self.race().await else {
            return;
        };
        let config = self.config.read().await.clone();
        let (tick_ms, speed) = config.clock.cadence(testing);

        let mut tasks = self.tasks.lock().await;
        tasks.stop();

        let (alert_tx, alert_rx) = create_alert_channel();
        let service = AlertService::new(
            Arc::new(TerminalBell::detect()),
            Arc::new(NoVibration),
            Arc::clone(&self.board),
            config.alerts.clone(),
        );
        tasks.alerts = Some(tokio::spawn(service.run(alert_rx)));

        let session = RaceSession::new(
            race,
            AlertDispatcher::new(config.alerts),
            alert_tx,
            Duration::from_millis(tick_ms),
        );
        tasks.session = Some(session.spawn());
        info!(tick_ms, speed, "Race session started");
    }

    pub async fn stop_session(&self) {
        self.tasks.lock().await.stop();
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
