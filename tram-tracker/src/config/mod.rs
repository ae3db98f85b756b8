//! Tracking configuration.
//!
//! The config document is re-read on every poll so edits take effect
//! without a restart. Which station/line/direction is tracked depends on
//! the wall clock when the document defines time windows; see
//! [`AppConfig::resolve`].

mod app;
mod error;
mod store;
mod time_window;

pub use app::{
    AppConfig, ConfigMode, DEFAULT_DEPARTURE_LIMIT, DEFAULT_REFRESH_INTERVAL_SECS,
    FALLBACK_STATION, TrackingConfig,
};
pub use error::ConfigError;
pub use store::{ConfigStore, InMemoryStore, JsonFileStore};
pub use time_window::{InvalidTimeOfDay, TimeWindow, parse_time_of_day};
