//! Golemio PID departure board client.
//!
//! Golemio is the Prague open-data API. The departure board endpoint
//! returns upcoming departures for one or more stops, sorted by time.
//!
//! Key characteristics:
//! - Authentication is an API key in the `x-access-token` header
//! - Stations are queried by name (`names=Kobylisy`), which covers all of
//!   the station's platforms
//! - Timestamps carry an offset; we ask for Prague local time

mod client;
mod error;
mod mock;
mod types;

pub use client::{
    DepartureBoardQuery, FetchRequest, GolemioConfig, HttpFetch, HttpResponse, PREFERRED_TIMEZONE,
    ReqwestFetcher,
};
pub use error::FetchError;
pub use mock::MockFetcher;
pub use types::{Delay, Departure, DepartureBoard, DepartureTimestamp, Route, Stop, Trip};
