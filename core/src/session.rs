//! Live race session: the tick loop
//!
//! Each tick reads the clock, advances runner status, reprojects the
//! cohorts and lets the dispatcher pick alerts. The race and its clock sit
//! behind one lock and the tick task is the only writer while it runs;
//! alert delivery happens on the alert service's own tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc::error::TrySendError, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::alerts::{AlertDispatcher, AlertRequest, AlertSender};
use crate::clock::RaceClock;
use crate::race::{Race, RaceStatus};
use crate::schedule::{ProjectionMode, Schedule};

/// Race plus the clock measuring it
#[derive(Debug, Clone)]
pub struct LiveRace {
    pub race: Race,
    pub clock: RaceClock,
}

impl LiveRace {
    pub fn new(race: Race, clock: RaceClock) -> Self {
        Self { race, clock }
    }

    /// Live race for a loaded race. A saved clock picks up where it left
    /// off; an active race saved without one runs on from its start time.
    pub fn restore(race: Race, now_utc: DateTime<Utc>, now: Instant) -> Self {
        let clock = match (race.clock_snapshot(), race.status()) {
            (Some(snapshot), _) => RaceClock::restore(snapshot, now_utc, now),
            (None, RaceStatus::Active) => match race.elapsed_ms_at(now_utc) {
                Some(elapsed_ms) => RaceClock::running_at(elapsed_ms, 1, now),
                None => RaceClock::default(),
            },
            (None, _) => RaceClock::default(),
        };
        Self::new(race, clock)
    }

    /// Copy the clock into the race so it survives a save
    pub fn checkpoint(&mut self, now: Instant, now_utc: DateTime<Utc>) {
        let snapshot = self.clock.snapshot(now, now_utc);
        self.race.set_clock_snapshot(snapshot);
    }

    /// Projection mode follows the race status: before the gun every cohort
    /// is shown as pending.
    pub fn projection_mode(&self) -> ProjectionMode {
        match self.race.status() {
            RaceStatus::Active | RaceStatus::Finished => ProjectionMode::Live,
            RaceStatus::Setup | RaceStatus::Checkin => ProjectionMode::PreRace,
        }
    }

    pub fn elapsed_ms(&self, now: Instant) -> i64 {
        self.clock.elapsed_ms(now)
    }
}

/// Shared handle to the live race
pub type SharedRace = Arc<RwLock<LiveRace>>;

/// Output of one evaluation pass
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub schedule: Schedule,
    pub alerts: Vec<AlertRequest>,
    pub newly_started: usize,
}

/// One full evaluation pass
pub fn tick(live: &mut LiveRace, dispatcher: &mut AlertDispatcher, now: Instant) -> TickOutcome {
    let elapsed_ms = live.elapsed_ms(now);
    let mode = live.projection_mode();

    let newly_started = live.race.mark_started_runners(elapsed_ms);
    let schedule = Schedule::project(live.race.checked_in_runners(), elapsed_ms, mode);
    let alerts = dispatcher.evaluate(&schedule);

    TickOutcome {
        schedule,
        alerts,
        newly_started,
    }
}

/// Drives ticks on a fixed interval
pub struct RaceSession {
    race: SharedRace,
    dispatcher: AlertDispatcher,
    alerts: AlertSender,
    interval: Duration,
}

/// Handle to a running session
pub struct SessionHandle {
    task: JoinHandle<()>,
    schedule: watch::Receiver<Schedule>,
}

impl SessionHandle {
    /// Latest projection, updated every tick
    pub fn schedule(&self) -> Schedule {
        self.schedule.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Schedule> {
        self.schedule.clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl RaceSession {
    pub fn new(race: SharedRace, dispatcher: AlertDispatcher, alerts: AlertSender, interval: Duration) -> Self {
        Self {
            race,
            dispatcher,
            alerts,
            interval,
        }
    }

    /// Spawn the tick loop onto the current runtime
    pub fn spawn(self) -> SessionHandle {
        let (schedule_tx, schedule_rx) = watch::channel(Schedule::default());
        let task = tokio::spawn(self.run(schedule_tx));
        SessionHandle {
            task,
            schedule: schedule_rx,
        }
    }

    async fn run(mut self, schedule_tx: watch::Sender<Schedule>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let outcome = {
                let mut live = self.race.write().await;
                tick(&mut live, &mut self.dispatcher, Instant::now())
            };

            if outcome.newly_started > 0 {
                debug!(count = outcome.newly_started, "Runners started");
            }

            for alert in outcome.alerts {
                // Never wait on delivery from the tick loop
                match self.alerts.try_send(alert) {
                    Ok(()) => {}
                    Err(TrySendError::Full(alert)) => {
                        warn!(start_offset_ms = alert.start_offset_ms, "Alert queue full, alert dropped");
                    }
                    Err(TrySendError::Closed(_)) => {
                        warn!("Alert service stopped, ending session");
                        return;
                    }
                }
            }

            if schedule_tx.send(outcome.schedule).is_err() {
                debug!("No schedule subscribers left, ending session");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::alerts::create_alert_channel;
    use crate::race::{Distance, Runner};

    fn make_live(status_active: bool) -> LiveRace {
        let mut race = Race::new("club", NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        race.add_runner(Runner::new(101, "Alex", Distance::FiveK).with_handicap("01:30".parse().unwrap()))
            .unwrap();
        race.add_runner(Runner::new(102, "Blair", Distance::TenK).with_handicap("00:05".parse().unwrap()))
            .unwrap();
        race.open_checkin().unwrap();
        race.check_in(101).unwrap();
        race.check_in(102).unwrap();
        if status_active {
            race.start(Utc::now()).unwrap();
        }
        LiveRace::new(race, RaceClock::default())
    }

    #[test]
    fn pre_race_tick_shows_all_and_alerts_nothing() {
        let mut live = make_live(false);
        let mut dispatcher = AlertDispatcher::default();
        let t0 = Instant::now();
        live.clock.start(t0);

        let outcome = tick(&mut live, &mut dispatcher, t0 + Duration::from_millis(1_000));
        assert_eq!(outcome.schedule.mode, ProjectionMode::PreRace);
        assert_eq!(outcome.schedule.cohorts.len(), 2);
        assert!(outcome.alerts.is_empty());
        assert_eq!(outcome.newly_started, 0);
    }

    #[test]
    fn live_tick_starts_runners_and_alerts_once() {
        let mut live = make_live(true);
        let mut dispatcher = AlertDispatcher::default();
        let t0 = Instant::now();
        live.clock.start(t0);

        let outcome = tick(&mut live, &mut dispatcher, t0 + Duration::from_millis(1_100));
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].start_offset_ms, 5_000);

        let outcome = tick(&mut live, &mut dispatcher, t0 + Duration::from_millis(1_200));
        assert!(outcome.alerts.is_empty());

        let outcome = tick(&mut live, &mut dispatcher, t0 + Duration::from_millis(5_000));
        assert_eq!(outcome.newly_started, 1);
        assert_eq!(
            live.race.runner(102).unwrap().status,
            crate::race::RunnerStatus::Racing
        );
    }

    #[test]
    fn paused_clock_keeps_triggered_alerts() {
        let mut live = make_live(true);
        let mut dispatcher = AlertDispatcher::default();
        let t0 = Instant::now();
        live.clock.start(t0);

        let fired = tick(&mut live, &mut dispatcher, t0 + Duration::from_millis(1_100));
        assert_eq!(fired.alerts.len(), 1);

        live.clock.pause(t0 + Duration::from_millis(1_150));
        live.clock.start(t0 + Duration::from_secs(30));
        let after = tick(&mut live, &mut dispatcher, t0 + Duration::from_millis(30_100));
        assert!(after.alerts.is_empty());
        assert!(dispatcher.is_triggered(5_000));
    }

    fn reload(live: &LiveRace) -> Race {
        let text = toml::to_string(&live.race).unwrap();
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn reload_keeps_testing_speed_and_elapsed_time() {
        let u0 = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let t0 = Instant::now();
        let mut live = make_live(true);
        live.clock = RaceClock::new(10);
        live.clock.start(t0);

        live.checkpoint(t0 + Duration::from_secs(30), u0);
        assert_eq!(live.elapsed_ms(t0 + Duration::from_secs(30)), 300_000);

        let t1 = Instant::now();
        let restored = LiveRace::restore(reload(&live), u0, t1);
        assert_eq!(restored.clock.speed(), 10);
        assert_eq!(restored.elapsed_ms(t1), 300_000);
        assert_eq!(restored.elapsed_ms(t1 + Duration::from_secs(1)), 310_000);
    }

    #[test]
    fn reload_keeps_a_paused_clock_frozen() {
        let u0 = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let t0 = Instant::now();
        let mut live = make_live(true);
        live.clock.start(t0);
        live.clock.pause(t0 + Duration::from_secs(10));

        live.checkpoint(t0 + Duration::from_secs(70), u0 + chrono::Duration::seconds(70));

        let t1 = Instant::now();
        let restored = LiveRace::restore(reload(&live), u0 + chrono::Duration::seconds(300), t1);
        assert!(!restored.clock.is_running());
        assert_eq!(restored.elapsed_ms(t1 + Duration::from_secs(5)), 10_000);
    }

    #[test]
    fn active_race_without_saved_clock_runs_from_start_time() {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let mut race = make_live(false).race;
        race.start(start).unwrap();

        let t1 = Instant::now();
        let restored = LiveRace::restore(race, start + chrono::Duration::seconds(95), t1);
        assert!(restored.clock.is_running());
        assert_eq!(restored.elapsed_ms(t1), 95_000);
    }

    #[test]
    fn race_not_yet_started_restores_a_stopped_clock() {
        let restored = LiveRace::restore(make_live(false).race, Utc::now(), Instant::now());
        assert!(!restored.clock.is_running());
        assert_eq!(restored.elapsed_ms(Instant::now()), 0);
    }

    #[tokio::test]
    async fn spawned_session_publishes_schedule_and_alerts() {
        let mut live = make_live(true);
        // Testing-mode clock so the 01:00 lead window for the 00:05 cohort arrives quickly
        live.clock = RaceClock::new(10);
        live.clock.start(Instant::now());
        let shared: SharedRace = Arc::new(RwLock::new(live));

        let (tx, mut rx) = create_alert_channel();
        let session = RaceSession::new(
            Arc::clone(&shared),
            AlertDispatcher::default(),
            tx,
            Duration::from_millis(10),
        );
        let handle = session.spawn();

        let alert = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("alert within timeout")
            .expect("channel open");
        assert_eq!(alert.start_offset_ms, 5_000);
        assert!(handle.schedule().elapsed_ms > 0);

        handle.stop();
    }
}
