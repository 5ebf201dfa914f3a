pub mod alerts;
pub mod clock;
pub mod context;
pub mod finish;
pub mod handicap;
pub mod race;
pub mod registration;
pub mod results;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod timing;

// Re-exports for convenience
pub use alerts::{
    AlertCapability, AlertDispatcher, AlertRequest, AlertService, SharedAlertBoard,
    VisualAlertBoard, create_alert_channel,
};
pub use clock::{ClockSnapshot, RaceClock};
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use finish::{FinishFlag, FinishRecord, FinishRecorder};
pub use handicap::HandicapEngine;
pub use race::{Distance, MemberNumber, Membership, Race, RaceError, RaceStatus, Runner, RunnerStatus};
pub use registration::{FIRST_TEMP_NUMBER, TempNumberIssuer};
pub use results::{DistanceResults, HandicapResult, ResultsRanker};
pub use schedule::{ProjectionMode, Schedule, StartGroup};
pub use session::{LiveRace, RaceSession, SessionHandle, SharedRace, TickOutcome};
pub use storage::{RaceStore, StorageError, TomlRaceStore};
pub use timing::{Handicap, TimeCodecError};
