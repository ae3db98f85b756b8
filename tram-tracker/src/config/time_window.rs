//! Scheduled tracking overrides.
//!
//! A time window says "between these two clock times, track this station
//! instead". Times are stored as the strings the user wrote so a typo in
//! the config file never prevents it from loading; a window whose times
//! don't parse is simply never active.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::TrackingConfig;

/// Error returned when a time-of-day string can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day: {reason}")]
pub struct InvalidTimeOfDay {
    reason: &'static str,
}

impl InvalidTimeOfDay {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a local time of day.
///
/// Accepts `H:MM`, `HH:MM` and `HH:MM:SS`, with surrounding whitespace
/// ignored.
///
/// # Examples
///
/// ```
/// use tram_tracker::config::parse_time_of_day;
/// use chrono::NaiveTime;
///
/// assert_eq!(
///     parse_time_of_day("08:00").unwrap(),
///     NaiveTime::from_hms_opt(8, 0, 0).unwrap()
/// );
/// assert_eq!(
///     parse_time_of_day("7:45").unwrap(),
///     NaiveTime::from_hms_opt(7, 45, 0).unwrap()
/// );
/// assert!(parse_time_of_day("24:00").is_err());
/// assert!(parse_time_of_day("noon").is_err());
/// ```
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, InvalidTimeOfDay> {
    let mut parts = s.trim().split(':');

    let hour = parts
        .next()
        .and_then(parse_digits)
        .ok_or_else(|| InvalidTimeOfDay::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(InvalidTimeOfDay::new("hour must be 0-23"));
    }

    let minute = parts
        .next()
        .filter(|m| m.len() == 2)
        .and_then(parse_digits)
        .ok_or_else(|| InvalidTimeOfDay::new("expected two minute digits"))?;
    if minute > 59 {
        return Err(InvalidTimeOfDay::new("minute must be 0-59"));
    }

    let second = match parts.next() {
        None => 0,
        Some(sec) if sec.len() == 2 => parse_digits(sec)
            .filter(|&s| s <= 59)
            .ok_or_else(|| InvalidTimeOfDay::new("second must be 0-59"))?,
        Some(_) => return Err(InvalidTimeOfDay::new("expected two second digits")),
    };

    if parts.next().is_some() {
        return Err(InvalidTimeOfDay::new("too many components"));
    }

    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| InvalidTimeOfDay::new("invalid time"))
}

/// Parse one or two ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn default_start() -> String {
    "00:00".to_string()
}

fn default_end() -> String {
    "23:59".to_string()
}

/// A clock interval during which a specific tracking tuple is active.
///
/// If `end_time` is earlier than `start_time` the window crosses midnight
/// (e.g. `22:00`–`02:00`). Equal start and end times describe an empty
/// window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeWindow {
    /// Inclusive start, e.g. "08:00".
    #[serde(default = "default_start")]
    pub start_time: String,

    /// Exclusive end, e.g. "16:00".
    #[serde(default = "default_end")]
    pub end_time: String,

    /// What to track while the window is active.
    #[serde(flatten)]
    pub tracking: TrackingConfig,
}

impl TimeWindow {
    /// Create a new window.
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        tracking: TrackingConfig,
    ) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            tracking,
        }
    }

    /// The parsed start time, if valid.
    pub fn start(&self) -> Option<NaiveTime> {
        parse_time_of_day(&self.start_time).ok()
    }

    /// The parsed end time, if valid.
    pub fn end(&self) -> Option<NaiveTime> {
        parse_time_of_day(&self.end_time).ok()
    }

    /// Whether the window covers the given time of day.
    pub fn is_active(&self, now: NaiveTime) -> bool {
        let (Some(start), Some(end)) = (self.start(), self.end()) else {
            return false;
        };

        if start < end {
            start <= now && now < end
        } else if start > end {
            now >= start || now < end
        } else {
            false
        }
    }
}
