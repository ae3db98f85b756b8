//! Golemio client error types.

/// Transport-level failures talking to the departure board API.
///
/// HTTP error statuses are not errors at this layer; they come back as an
/// [`HttpResponse`](super::HttpResponse) so the caller can report them.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection, timeout, body read, etc.)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The request URL could not be built
    #[error("invalid URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// A stand-in transport failure (mock fetcher)
    #[error("{0}")]
    Unavailable(String),
}
