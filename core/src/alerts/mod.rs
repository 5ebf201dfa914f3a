//! Start alerts
//!
//! This module provides:
//! - **Dispatcher**: decides, once per tick, which cohorts are due a "go" alert
//! - **Capabilities**: injected audio / vibration hardware handles
//! - **Service**: async delivery with a visual + vibration fallback
//!
//! Decisions and delivery are split so the tick loop never waits on audio.

mod capability;
mod dispatcher;
mod events;
mod service;
mod visual;


pub use capability::{AlertCapability, NoVibration, SilentAlert, Vibrator};
pub use dispatcher::AlertDispatcher;
pub use events::{AlertRequest, Delivery};
pub use service::{AlertSender, AlertService, create_alert_channel};
pub use visual::{SharedAlertBoard, VisualAlert, VisualAlertBoard};
