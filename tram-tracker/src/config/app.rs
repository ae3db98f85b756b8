//! The application config document and active-tuple resolution.

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::time_window::TimeWindow;

/// Station tracked when nothing else is configured.
pub const FALLBACK_STATION: &str = "Kobylisy";

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 30;

/// Default number of departures requested per fetch.
pub const DEFAULT_DEPARTURE_LIMIT: i64 = 5;

fn default_station() -> String {
    FALLBACK_STATION.to_string()
}

/// What to track right now: a station, optionally narrowed to a line and
/// a direction (matched against the vehicle headsign).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrackingConfig {
    #[serde(default = "default_station")]
    pub station_name: String,

    #[serde(default)]
    pub line_number: Option<String>,

    #[serde(default)]
    pub direction: Option<String>,
}

impl TrackingConfig {
    /// Track every departure from a station.
    pub fn station(name: impl Into<String>) -> Self {
        Self {
            station_name: name.into(),
            line_number: None,
            direction: None,
        }
    }

    /// Narrow to a single line.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line_number = Some(line.into());
        self
    }

    /// Narrow to headsigns containing `direction`.
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// The built-in tuple used when a time-based config has no match and
    /// no default.
    pub fn fallback() -> Self {
        Self::station(FALLBACK_STATION)
    }

    /// The line filter, treating an empty string as unset.
    pub fn line_filter(&self) -> Option<&str> {
        self.line_number.as_deref().filter(|s| !s.is_empty())
    }

    /// The direction filter, treating an empty string as unset.
    pub fn direction_filter(&self) -> Option<&str> {
        self.direction.as_deref().filter(|s| !s.is_empty())
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self::fallback()
    }
}

/// The top-level configuration document.
///
/// The flat `station_name`/`line_number`/`direction` fields are the legacy
/// format. A non-empty `time_windows` list switches the document into
/// time-based mode, see [`AppConfig::mode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppConfig {
    pub station_name: String,
    pub line_number: Option<String>,
    pub direction: Option<String>,

    /// Seconds between fetches.
    pub refresh_interval_seconds: i64,

    /// Maximum departures requested from the departure board.
    pub departure_limit: i64,

    /// API key, used when none is provided through the environment.
    pub api_key: Option<String>,

    /// Scheduled overrides, first match wins.
    pub time_windows: Option<Vec<TimeWindow>>,

    /// Used in time-based mode when no window is active.
    pub default_config: Option<TrackingConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            station_name: FALLBACK_STATION.to_string(),
            line_number: Some("17".to_string()),
            direction: None,
            refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
            departure_limit: DEFAULT_DEPARTURE_LIMIT,
            api_key: None,
            time_windows: None,
            default_config: None,
        }
    }
}

/// How a config document selects its tracking tuple.
///
/// Computed from the document every time it is read, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigMode<'a> {
    /// Always track the flat top-level fields.
    Legacy(TrackingConfig),

    /// Track the first active window, else `default`.
    TimeBased {
        windows: &'a [TimeWindow],
        default: TrackingConfig,
    },
}

impl ConfigMode<'_> {
    /// Pick the tuple to track at `now`.
    pub fn resolve(&self, now: NaiveTime) -> TrackingConfig {
        match self {
            ConfigMode::Legacy(tracking) => tracking.clone(),
            ConfigMode::TimeBased { windows, default } => windows
                .iter()
                .find(|w| w.is_active(now))
                .map(|w| w.tracking.clone())
                .unwrap_or_else(|| default.clone()),
        }
    }
}

impl AppConfig {
    /// Whether this document uses time windows.
    pub fn is_time_based(&self) -> bool {
        self.time_windows.as_ref().is_some_and(|w| !w.is_empty())
    }

    /// The document's selection mode.
    pub fn mode(&self) -> ConfigMode<'_> {
        match self.time_windows.as_deref() {
            Some(windows) if !windows.is_empty() => ConfigMode::TimeBased {
                windows,
                default: self
                    .default_config
                    .clone()
                    .unwrap_or_else(TrackingConfig::fallback),
            },
            _ => ConfigMode::Legacy(TrackingConfig {
                station_name: self.station_name.clone(),
                line_number: self.line_number.clone(),
                direction: self.direction.clone(),
            }),
        }
    }

    /// The tracking tuple active at the given local time of day.
    pub fn resolve(&self, now: NaiveTime) -> TrackingConfig {
        self.mode().resolve(now)
    }

    /// The interval between fetches.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.max(1) as u64)
    }

    /// The number of departures to request.
    pub fn departure_limit(&self) -> u32 {
        self.departure_limit.clamp(1, u32::MAX as i64) as u32
    }

    /// Normalize out-of-range settings and log anything suspicious.
    ///
    /// Windows with unparseable times are kept; they just never match.
    pub fn validated(mut self) -> Self {
        if self.refresh_interval_seconds < 1 {
            warn!(
                value = self.refresh_interval_seconds,
                "RefreshIntervalSeconds must be at least 1, using {DEFAULT_REFRESH_INTERVAL_SECS}"
            );
            self.refresh_interval_seconds = DEFAULT_REFRESH_INTERVAL_SECS;
        }

        if self.departure_limit < 1 {
            warn!(
                value = self.departure_limit,
                "DepartureLimit must be at least 1, using {DEFAULT_DEPARTURE_LIMIT}"
            );
            self.departure_limit = DEFAULT_DEPARTURE_LIMIT;
        }

        if !self.is_time_based() {
            return self;
        }

        for (i, window) in self.time_windows.iter().flatten().enumerate() {
            if window.start().is_none() {
                warn!("TimeWindows[{i}] has invalid StartTime: '{}'", window.start_time);
            }
            if window.end().is_none() {
                warn!("TimeWindows[{i}] has invalid EndTime: '{}'", window.end_time);
            }
            if window.tracking.station_name.is_empty() {
                warn!("TimeWindows[{i}] has empty StationName");
            }
        }

        if self.default_config.is_none() {
            warn!("time-based config has no DefaultConfig, falling back to {FALLBACK_STATION}");
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn time_based(windows: Vec<TimeWindow>, default: Option<TrackingConfig>) -> AppConfig {
        AppConfig {
            time_windows: Some(windows),
            default_config: default,
            ..AppConfig::default()
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.station_name, "Kobylisy");
        assert_eq!(config.line_number.as_deref(), Some("17"));
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.departure_limit(), 5);
        assert!(!config.is_time_based());
    }

    #[test]
    fn legacy_mode_returns_flat_fields() {
        let config = AppConfig {
            station_name: "Kobylisy".into(),
            line_number: Some("17".into()),
            direction: Some("Sídliště Modřany".into()),
            ..AppConfig::default()
        };

        let tracking = config.resolve(t(10, 0));
        assert_eq!(
            tracking,
            TrackingConfig::station("Kobylisy")
                .with_line("17")
                .with_direction("Sídliště Modřany")
        );
    }

    #[test]
    fn empty_window_list_is_legacy_mode() {
        let config = time_based(vec![], Some(TrackingConfig::station("Anděl")));
        assert!(!config.is_time_based());
        assert!(matches!(config.mode(), ConfigMode::Legacy(_)));
        assert_eq!(config.resolve(t(10, 0)).station_name, "Kobylisy");
    }

    #[test]
    fn window_then_default() {
        let work = TrackingConfig::station("Karlovo náměstí").with_line("22");
        let home = TrackingConfig::station("Kobylisy").with_line("17");
        let config = time_based(
            vec![TimeWindow::new("08:00", "16:00", work.clone())],
            Some(home.clone()),
        );

        assert_eq!(config.resolve(t(10, 0)), work);
        assert_eq!(config.resolve(t(20, 0)), home);
    }

    #[test]
    fn first_matching_window_wins() {
        let first = TrackingConfig::station("First");
        let second = TrackingConfig::station("Second");
        let config = time_based(
            vec![
                TimeWindow::new("08:00", "12:00", first.clone()),
                TimeWindow::new("06:00", "18:00", second.clone()),
            ],
            None,
        );

        assert_eq!(config.resolve(t(9, 0)), first);
        assert_eq!(config.resolve(t(7, 0)), second);
        assert_eq!(config.resolve(t(13, 0)), second);
    }

    #[test]
    fn no_match_without_default_uses_fallback() {
        let config = time_based(
            vec![TimeWindow::new("08:00", "09:00", TrackingConfig::station("X"))],
            None,
        );

        assert_eq!(config.resolve(t(22, 0)), TrackingConfig::fallback());
        assert_eq!(TrackingConfig::fallback().station_name, "Kobylisy");
        assert!(TrackingConfig::fallback().line_number.is_none());
        assert!(TrackingConfig::fallback().direction.is_none());
    }

    #[test]
    fn resolve_is_deterministic() {
        let config = time_based(
            vec![TimeWindow::new("22:00", "02:00", TrackingConfig::station("Night"))],
            Some(TrackingConfig::station("Day")),
        );

        for _ in 0..3 {
            assert_eq!(config.resolve(t(23, 30)).station_name, "Night");
            assert_eq!(config.resolve(t(12, 0)).station_name, "Day");
        }
    }

    #[test]
    fn empty_filters_are_unset() {
        let tracking = TrackingConfig::station("Kobylisy")
            .with_line("")
            .with_direction("");
        assert_eq!(tracking.line_filter(), None);
        assert_eq!(tracking.direction_filter(), None);
    }

    #[test]
    fn validated_normalizes_settings() {
        let config = AppConfig {
            refresh_interval_seconds: 0,
            departure_limit: -3,
            ..AppConfig::default()
        }
        .validated();

        assert_eq!(config.refresh_interval_seconds, DEFAULT_REFRESH_INTERVAL_SECS);
        assert_eq!(config.departure_limit, DEFAULT_DEPARTURE_LIMIT);
    }

    #[test]
    fn validated_keeps_malformed_windows() {
        let config = time_based(
            vec![TimeWindow::new("nope", "16:00", TrackingConfig::station("X"))],
            None,
        )
        .validated();

        assert_eq!(config.time_windows.as_ref().map(Vec::len), Some(1));
        assert_eq!(config.resolve(t(10, 0)), TrackingConfig::fallback());
    }

    #[test]
    fn deserialize_legacy_document() {
        let json = r#"{
            "StationName": "Palmovka",
            "LineNumber": "3",
            "RefreshIntervalSeconds": 15,
            "SomethingElse": true
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.station_name, "Palmovka");
        assert_eq!(config.line_number.as_deref(), Some("3"));
        assert_eq!(config.refresh_interval(), Duration::from_secs(15));
        assert_eq!(config.departure_limit(), 5);
        assert!(!config.is_time_based());
    }

    #[test]
    fn deserialize_time_based_document() {
        let json = r#"{
            "RefreshIntervalSeconds": 20,
            "DepartureLimit": 10,
            "TimeWindows": [
                {"StartTime": "07:00", "EndTime": "09:00", "StationName": "Kobylisy", "LineNumber": "17"},
                {"StartTime": "16:00", "EndTime": "18:30", "StationName": "Vltavská", "Direction": "Kobylisy"}
            ],
            "DefaultConfig": {"StationName": "Ládví"}
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(config.is_time_based());
        assert_eq!(config.resolve(t(8, 0)).line_number.as_deref(), Some("17"));
        assert_eq!(config.resolve(t(17, 0)).station_name, "Vltavská");
        assert_eq!(config.resolve(t(12, 0)).station_name, "Ládví");
    }
}
