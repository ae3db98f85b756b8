//! Data transfer objects for web responses.

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;

use crate::arrival::{ArrivalState, FollowingDeparture};

/// The published arrival state, as served by `/api/state`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    /// Line of the tracked departure, `--` before the first match
    pub line_number: String,

    /// Headsign of the tracked departure
    pub direction: String,

    /// Whole minutes until departure
    pub minutes_to_arrival: Option<u32>,

    pub delay_minutes: Option<i32>,

    /// Predicted departure time
    pub predicted_arrival: Option<DateTime<FixedOffset>>,

    /// Progress of the vehicle towards the stop, 0.0 to 1.0
    pub vehicle_position: f64,

    /// When this state was derived
    pub last_updated: Option<DateTime<Local>>,

    pub error_message: Option<String>,

    /// The next matching departure
    pub following: Option<FollowingResponse>,

    pub has_data: bool,

    /// `on-time`, `minor` or `major`
    pub delay_severity: &'static str,

    /// Short arrival text, e.g. `5m`
    pub formatted_arrival: String,

    /// Multi-line description
    pub summary: String,
}

impl From<&ArrivalState> for StateResponse {
    fn from(state: &ArrivalState) -> Self {
        Self {
            line_number: state.line_number().to_string(),
            direction: state.direction().to_string(),
            minutes_to_arrival: state.minutes_to_arrival(),
            delay_minutes: state.delay_minutes(),
            predicted_arrival: state.predicted_arrival(),
            vehicle_position: state.vehicle_position(),
            last_updated: state.last_updated(),
            error_message: state.error_message().map(String::from),
            following: state.following().map(FollowingResponse::from),
            has_data: state.has_data(),
            delay_severity: state.delay_severity().as_str(),
            formatted_arrival: state.formatted_arrival(),
            summary: state.summary(),
        }
    }
}

/// The departure after the tracked one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingResponse {
    pub line_number: String,
    pub direction: String,
    pub minutes_to_arrival: Option<u32>,
}

impl From<&FollowingDeparture> for FollowingResponse {
    fn from(next: &FollowingDeparture) -> Self {
        Self {
            line_number: next.line_number.clone(),
            direction: next.direction.clone(),
            minutes_to_arrival: next.minutes_to_arrival,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::golemio::Departure;
    use chrono::TimeDelta;

    fn departure(line: &str, headsign: &str, minutes: i64) -> Departure {
        let predicted = Local::now() + TimeDelta::minutes(minutes) + TimeDelta::seconds(30);
        serde_json::from_value(serde_json::json!({
            "route": {"short_name": line},
            "trip": {"headsign": headsign},
            "departure_timestamp": {"predicted": predicted.to_rfc3339()},
            "delay": {"minutes": 3}
        }))
        .unwrap()
    }

    #[test]
    fn serializes_camel_case_with_derived_fields() {
        let current = departure("17", "Sídliště Modřany", 2);
        let next = departure("17", "Vozovna Kobylisy", 8);
        let state = ArrivalState::from_departures(&current, Some(&next), Local::now());

        let json = serde_json::to_value(StateResponse::from(&state)).unwrap();

        assert_eq!(json["lineNumber"], "17");
        assert_eq!(json["direction"], "Sídliště Modřany");
        assert_eq!(json["minutesToArrival"], 2);
        assert_eq!(json["delayMinutes"], 3);
        assert_eq!(json["vehiclePosition"], 0.75);
        assert_eq!(json["hasData"], true);
        assert_eq!(json["delaySeverity"], "minor");
        assert_eq!(json["formattedArrival"], "2m");
        assert!(json["errorMessage"].is_null());
        assert_eq!(json["following"]["lineNumber"], "17");
        assert_eq!(json["following"]["minutesToArrival"], 8);
        assert!(
            json["summary"]
                .as_str()
                .unwrap()
                .starts_with("Line 17 to Sídliště Modřany\nArrives in: 2m")
        );
        assert!(json["predictedArrival"].is_string());
    }

    #[test]
    fn error_state_has_no_data() {
        let state = ArrivalState::error("API key not configured", Local::now());
        let json = serde_json::to_value(StateResponse::from(&state)).unwrap();

        assert_eq!(json["hasData"], false);
        assert_eq!(json["lineNumber"], "--");
        assert_eq!(json["formattedArrival"], "--");
        assert_eq!(json["errorMessage"], "API key not configured");
        assert_eq!(json["summary"], "API key not configured");
        assert!(json["following"].is_null());
    }
}
