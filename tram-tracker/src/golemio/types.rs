//! Golemio departure board response DTOs.
//!
//! Only the fields the tracker reads are modelled; serde ignores the rest.
//! Every sub-object is optional because Golemio sends `null` for data it
//! doesn't have (e.g. `delay` for vehicles without GPS).

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Response from `GET /v2/pid/departureboards`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartureBoard {
    /// Departures, earliest first.
    #[serde(default)]
    pub departures: Option<Vec<Departure>>,

    /// Stops the query resolved to.
    #[serde(default)]
    pub stops: Option<Vec<Stop>>,
}

impl DepartureBoard {
    /// The departures, treating a missing list as empty.
    pub fn departures(&self) -> &[Departure] {
        self.departures.as_deref().unwrap_or_default()
    }
}

/// A single upcoming departure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Departure {
    pub route: Option<Route>,
    pub trip: Option<Trip>,
    pub departure_timestamp: Option<DepartureTimestamp>,
    pub delay: Option<Delay>,
    pub stop: Option<Stop>,
}

impl Departure {
    /// Route short name, e.g. "17".
    pub fn line(&self) -> Option<&str> {
        self.route.as_ref()?.short_name.as_deref()
    }

    /// Destination shown on the vehicle.
    pub fn headsign(&self) -> Option<&str> {
        self.trip.as_ref()?.headsign.as_deref()
    }

    /// Predicted departure from the stop.
    pub fn predicted(&self) -> Option<DateTime<FixedOffset>> {
        self.departure_timestamp.as_ref()?.predicted
    }

    /// Timetabled departure from the stop.
    pub fn scheduled(&self) -> Option<DateTime<FixedOffset>> {
        self.departure_timestamp.as_ref()?.scheduled
    }

    /// Current delay in whole minutes.
    pub fn delay_minutes(&self) -> Option<i32> {
        self.delay.as_ref()?.minutes
    }
}

/// Route (line) information.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Route {
    /// Public line number.
    pub short_name: Option<String>,

    /// GTFS route type (0 = tram, 3 = bus, ...).
    #[serde(rename = "type")]
    pub route_type: Option<i32>,
}

/// Trip information.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trip {
    pub headsign: Option<String>,
    pub id: Option<String>,
}

/// Departure times.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartureTimestamp {
    pub predicted: Option<DateTime<FixedOffset>>,
    pub scheduled: Option<DateTime<FixedOffset>>,
}

/// Delay information.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delay {
    pub minutes: Option<i32>,
    pub seconds: Option<i32>,
    pub is_available: Option<bool>,
}

/// A stop (platform) of the queried station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stop {
    pub id: Option<String>,
    pub name: Option<String>,
    pub platform_code: Option<String>,
}
