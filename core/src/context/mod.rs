mod config;
mod error;

pub use config::{
    APP_NAME, AlertSettings, AppConfig, AppConfigExt, ClockSettings, HandicapPolicy, PointsTable,
};
pub use error::ConfigError;
