//! Tram departure tracker.
//!
//! Polls Prague's Golemio departure board for one station, picks the
//! departures matching a configured line and direction, and publishes a
//! small arrival state (minutes to arrival, delay, vehicle position) for a
//! display to render. Which station to watch can change with the time of
//! day.

pub mod arrival;
pub mod config;
pub mod engine;
pub mod golemio;
pub mod matcher;
pub mod secrets;
pub mod web;
