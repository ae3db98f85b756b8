//! Mock fetcher for running without API access.
//!
//! Serves a canned response (typically a recorded departure board) as if
//! it came from Golemio, and records what was requested.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::client::{FetchRequest, HttpFetch, HttpResponse};
use super::error::FetchError;

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// Fetcher that returns a fixed reply.
///
/// Clones share the call counter and request log.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockFetcher {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with the given status and body.
    pub fn respond(status: u16, body: impl Into<String>) -> Self {
        Self::with_reply(Reply::Respond(HttpResponse {
            status,
            body: body.into(),
        }))
    }

    /// Respond 200 with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::respond(200, body)
    }

    /// Fail every request with a transport error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    /// Serve a recorded departure board from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|e| {
            FetchError::Unavailable(format!("failed to read mock board {path:?}: {e}"))
        })?;
        Ok(Self::ok(body))
    }

    /// Number of requests made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The requests made so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HttpFetch for MockFetcher {
    async fn get(&self, request: &FetchRequest) -> Result<HttpResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(FetchError::Unavailable(message.clone())),
        }
    }
}
