//! The arrival state published to the display.
//!
//! An [`ArrivalState`] is built from scratch on every poll, either from the
//! matched departures or from an error message, and never changes after
//! construction. "Has data" and "has error" are decided by which
//! constructor built it.

use chrono::{DateTime, FixedOffset, Local};

use crate::golemio::Departure;

/// Line label when the line is unknown.
const UNKNOWN_LINE: &str = "--";

/// Minutes until a predicted departure, rounded down and clamped at zero.
pub fn minutes_until(predicted: DateTime<FixedOffset>, now: DateTime<Local>) -> u32 {
    let minutes = predicted.signed_duration_since(now).num_minutes();
    minutes.clamp(0, u32::MAX as i64) as u32
}

/// Where the vehicle appears on a simplified three-stop route.
///
/// `0.0` is the first stop (six or more minutes out), `0.5` the middle stop
/// (three minutes out) and `1.0` the user's station.
///
/// ```
/// use tram_tracker::arrival::vehicle_position;
///
/// assert_eq!(vehicle_position(0), 1.0);
/// assert_eq!(vehicle_position(3), 0.5);
/// assert_eq!(vehicle_position(10), 0.0);
/// ```
pub fn vehicle_position(minutes_to_arrival: u32) -> f64 {
    let m = minutes_to_arrival as f64;
    let position = match minutes_to_arrival {
        0 => 1.0,
        1..=3 => 0.5 + (3.0 - m) * 0.25,
        4..=6 => (6.0 - m) / 6.0,
        _ => 0.0,
    };
    position.clamp(0.0, 1.0)
}

/// How late the vehicle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySeverity {
    /// No delay data, or at most a minute.
    OnTime,
    /// Two or three minutes.
    Minor,
    /// More than three minutes.
    Major,
}

impl DelaySeverity {
    pub fn from_delay(delay_minutes: Option<i32>) -> Self {
        match delay_minutes {
            None => DelaySeverity::OnTime,
            Some(m) if m <= 1 => DelaySeverity::OnTime,
            Some(m) if m <= 3 => DelaySeverity::Minor,
            Some(_) => DelaySeverity::Major,
        }
    }

    /// Stable lowercase name, used in JSON and CSS classes.
    pub fn as_str(&self) -> &'static str {
        match self {
            DelaySeverity::OnTime => "on-time",
            DelaySeverity::Minor => "minor",
            DelaySeverity::Major => "major",
        }
    }
}

/// The departure after the tracked one.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowingDeparture {
    pub line_number: String,
    pub direction: String,
    pub minutes_to_arrival: Option<u32>,
}

/// Snapshot of the tracked departure.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalState {
    line_number: String,
    direction: String,
    minutes_to_arrival: Option<u32>,
    delay_minutes: Option<i32>,
    predicted_arrival: Option<DateTime<FixedOffset>>,
    vehicle_position: f64,
    last_updated: Option<DateTime<Local>>,
    error_message: Option<String>,
    following: Option<FollowingDeparture>,
}

impl ArrivalState {
    /// The state before the first poll completes.
    pub fn pending() -> Self {
        Self {
            line_number: UNKNOWN_LINE.to_string(),
            direction: String::new(),
            minutes_to_arrival: None,
            delay_minutes: None,
            predicted_arrival: None,
            vehicle_position: 0.0,
            last_updated: None,
            error_message: None,
            following: None,
        }
    }

    /// Derive the state for `current`, with `next` as the following
    /// departure if there is one.
    ///
    /// A departure without a predicted time yields a state without an ETA.
    pub fn from_departures(
        current: &Departure,
        next: Option<&Departure>,
        now: DateTime<Local>,
    ) -> Self {
        let predicted_arrival = current.predicted();
        let minutes_to_arrival = predicted_arrival.map(|p| minutes_until(p, now));

        Self {
            line_number: current.line().unwrap_or(UNKNOWN_LINE).to_string(),
            direction: current.headsign().unwrap_or_default().to_string(),
            minutes_to_arrival,
            delay_minutes: current.delay_minutes(),
            predicted_arrival,
            vehicle_position: minutes_to_arrival.map_or(0.0, vehicle_position),
            last_updated: Some(now),
            error_message: None,
            following: next.map(|d| FollowingDeparture {
                line_number: d.line().unwrap_or(UNKNOWN_LINE).to_string(),
                direction: d.headsign().unwrap_or_default().to_string(),
                minutes_to_arrival: d.predicted().map(|p| minutes_until(p, now)),
            }),
        }
    }

    /// A state carrying only an error.
    pub fn error(message: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            error_message: Some(message.into()),
            last_updated: Some(now),
            ..Self::pending()
        }
    }

    pub fn line_number(&self) -> &str {
        &self.line_number
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    /// Whole minutes until departure; `None` means no data.
    pub fn minutes_to_arrival(&self) -> Option<u32> {
        self.minutes_to_arrival
    }

    pub fn delay_minutes(&self) -> Option<i32> {
        self.delay_minutes
    }

    pub fn predicted_arrival(&self) -> Option<DateTime<FixedOffset>> {
        self.predicted_arrival
    }

    /// Position along the three-stop route, in `[0, 1]`.
    pub fn vehicle_position(&self) -> f64 {
        self.vehicle_position
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn following(&self) -> Option<&FollowingDeparture> {
        self.following.as_ref()
    }

    pub fn delay_severity(&self) -> DelaySeverity {
        DelaySeverity::from_delay(self.delay_minutes)
    }

    /// Whether there is an ETA to show.
    pub fn has_data(&self) -> bool {
        self.minutes_to_arrival.is_some() && self.error_message.is_none()
    }

    /// Short arrival text: `<1m`, `5m`, or `--` without data.
    pub fn formatted_arrival(&self) -> String {
        match self.minutes_to_arrival {
            Some(m) if self.has_data() => format_minutes(m),
            _ => "--".to_string(),
        }
    }

    /// Multi-line description for tooltips and the console.
    pub fn summary(&self) -> String {
        if !self.has_data() {
            return self
                .error_message
                .clone()
                .unwrap_or_else(|| "No data available".to_string());
        }

        let mut lines = vec![
            format!("Line {} to {}", self.line_number, self.direction),
            format!("Arrives in: {}", self.formatted_arrival()),
        ];

        if let Some(predicted) = self.predicted_arrival {
            lines.push(format!("At: {}", predicted.format("%H:%M")));
        }

        if let Some(delay) = self.delay_minutes.filter(|&d| d > 0) {
            lines.push(format!("Delay: +{delay}min"));
        }

        if let Some(next) = &self.following {
            let mut then = format!("Then: {} to {}", next.line_number, next.direction);
            if let Some(m) = next.minutes_to_arrival {
                then.push_str(&format!(" in {}", format_minutes(m)));
            }
            lines.push(then);
        }

        if let Some(updated) = self.last_updated {
            lines.push(format!("Updated: {}", updated.format("%H:%M:%S")));
        }

        lines.join("\n")
    }
}

impl Default for ArrivalState {
    fn default() -> Self {
        Self::pending()
    }
}

fn format_minutes(minutes: u32) -> String {
    if minutes == 0 {
        "<1m".to_string()
    } else {
        format!("{minutes}m")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn position_is_bounded(m in any::<u32>()) {
            let p = vehicle_position(m);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn position_is_non_increasing(m in 0u32..1000) {
            prop_assert!(vehicle_position(m + 1) <= vehicle_position(m));
        }

        #[test]
        fn severity_is_monotonic(d in -10i32..30) {
            let rank = |s: DelaySeverity| match s {
                DelaySeverity::OnTime => 0,
                DelaySeverity::Minor => 1,
                DelaySeverity::Major => 2,
            };
            prop_assert!(
                rank(DelaySeverity::from_delay(Some(d)))
                    <= rank(DelaySeverity::from_delay(Some(d + 1)))
            );
        }
    }
}
