//! Failures of a single poll.

use crate::matcher::NoMatch;

/// Everything that can go wrong during one tick.
///
/// None of these stop the engine: each becomes an error
/// [`ArrivalState`](crate::arrival::ArrivalState) whose message is the
/// `Display` text, and the next tick tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickError {
    /// No API key in the environment, env file or config
    #[error("API key not configured")]
    ConfigurationMissing,

    /// The request never got a response
    #[error("Network error: {message}\n{url}")]
    Transport { url: String, message: String },

    /// Golemio answered with a non-2xx status
    #[error("API error: {}\n{url}", status_text(.status))]
    UpstreamStatus { status: u16, url: String },

    /// The response body isn't a departure board
    #[error("Unreadable response: {message}")]
    Decode { message: String },

    /// The station has no upcoming departures
    #[error("No departures found")]
    EmptyUpstream,

    /// Departures exist but none pass the line/direction filters
    #[error("{0}")]
    NoMatch(NoMatch),

    /// The pipeline panicked, or the request couldn't be built
    #[error("Error: {message}")]
    Internal { message: String },
}

/// "404 Not Found", or just the number for non-standard codes.
fn status_text(status: &u16) -> String {
    let status = *status;
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| status.to_string(), |reason| format!("{status} {reason}"))
}
