//! The polling orchestrator.
//!
//! A [`TrackingEngine`] owns the fetcher, the config store and the
//! secrets. On every tick it re-reads the config, resolves the tracking
//! tuple for the current time of day, fetches the departure board, picks
//! the matching departures and publishes the derived [`ArrivalState`].
//!
//! # Publishing
//!
//! The latest state lives in a `watch` channel. Readers either call
//! [`TrackingEngine::current`] or hold a [`StateReceiver`] and await
//! changes; they never see a half-built state.
//!
//! # Concurrency
//!
//! At most one fetch runs at a time. A tick that arrives while a fetch is
//! in flight is dropped, not queued. Failures of any kind, panics
//! included, end up as an error state and the next tick tries again.

mod error;
mod schedule;


pub use error::TickError;
pub use schedule::{IntervalChange, Phase, TickOutcome, ticker};

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::arrival::ArrivalState;
use crate::config::ConfigStore;
use crate::golemio::{DepartureBoard, DepartureBoardQuery, GolemioConfig, HttpFetch};
use crate::matcher::{NoMatch, match_departures};
use crate::secrets::{API_KEY_VAR, Secrets};

/// Receiving end of the published state.
pub type StateReceiver = watch::Receiver<Arc<ArrivalState>>;

/// Polls Golemio and publishes arrival states.
///
/// Cheap to clone; clones share the same state and in-flight guard.
pub struct TrackingEngine<F, S> {
    inner: Arc<Inner<F, S>>,
}

impl<F, S> Clone for TrackingEngine<F, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<F, S> {
    fetcher: F,
    store: S,
    secrets: Secrets,
    golemio: GolemioConfig,
    state: watch::Sender<Arc<ArrivalState>>,
    /// Refresh interval from the most recently read config.
    interval: watch::Sender<Duration>,
    fetching: Arc<AtomicBool>,
}

/// Holds the engine in [`Phase::Fetching`] until dropped.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<F, S> TrackingEngine<F, S>
where
    F: HttpFetch + 'static,
    S: ConfigStore + 'static,
{
    /// Create an idle engine publishing the pending state.
    ///
    /// The config is read once here to seed the refresh interval.
    pub fn new(fetcher: F, store: S, secrets: Secrets, golemio: GolemioConfig) -> Self {
        let initial_interval = store.load().refresh_interval();
        let (state, _) = watch::channel(Arc::new(ArrivalState::pending()));
        let (interval, _) = watch::channel(initial_interval);

        Self {
            inner: Arc::new(Inner {
                fetcher,
                store,
                secrets,
                golemio,
                state,
                interval,
                fetching: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// The most recently published state.
    pub fn current(&self) -> Arc<ArrivalState> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> StateReceiver {
        self.inner.state.subscribe()
    }

    pub fn phase(&self) -> Phase {
        if self.inner.fetching.load(Ordering::Acquire) {
            Phase::Fetching
        } else {
            Phase::Idle
        }
    }

    /// Refresh interval from the most recently read config.
    pub fn configured_interval(&self) -> Duration {
        *self.inner.interval.borrow()
    }

    /// Run one tick to completion.
    ///
    /// Returns [`TickOutcome::Skipped`] without doing anything when a fetch
    /// is already in flight.
    pub async fn tick(&self) -> TickOutcome {
        let Some(guard) = InFlight::acquire(&self.inner.fetching) else {
            debug!("fetch in flight, dropping tick");
            return TickOutcome::Skipped;
        };
        self.inner.run_tick(guard).await;
        TickOutcome::Completed
    }

    /// Start a tick in the background.
    ///
    /// Returns `false` when a fetch is already in flight.
    pub fn trigger(&self) -> bool {
        let Some(guard) = InFlight::acquire(&self.inner.fetching) else {
            debug!("fetch in flight, dropping tick");
            return false;
        };
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_tick(guard).await });
        true
    }

    /// Tick immediately, then every refresh interval, forever.
    ///
    /// When a tick reads a different interval from the config, the timer is
    /// re-armed with the new period starting from that moment.
    pub async fn run(&self) {
        let mut configured = self.inner.interval.subscribe();
        let mut period = *configured.borrow_and_update();
        let mut timer = ticker(Instant::now(), period);
        info!(?period, "tracking started");

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.trigger();
                }
                changed = configured.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = *configured.borrow_and_update();
                    if let IntervalChange::Changed(next) = IntervalChange::between(period, next) {
                        info!(from = ?period, to = ?next, "refresh interval changed");
                        period = next;
                        timer = ticker(Instant::now() + period, period);
                    }
                }
            }
        }
    }
}

impl<F: HttpFetch, S: ConfigStore> Inner<F, S> {
    async fn run_tick(&self, guard: InFlight) {
        let state = match AssertUnwindSafe(self.poll()).catch_unwind().await {
            Ok(Ok(state)) => state,
            Ok(Err(err)) => {
                warn!("tick failed: {err}");
                ArrivalState::error(err.to_string(), Local::now())
            }
            Err(panic) => {
                let err = TickError::Internal {
                    message: panic_message(panic.as_ref()),
                };
                error!("tick panicked: {err}");
                ArrivalState::error(err.to_string(), Local::now())
            }
        };

        self.state.send_replace(Arc::new(state));
        drop(guard);
    }

    /// The fetch-match-derive pipeline.
    async fn poll(&self) -> Result<ArrivalState, TickError> {
        let config = self.store.load();
        self.note_interval(config.refresh_interval());

        let tracking = config.resolve(Local::now().time());

        let api_key = self
            .secrets
            .get(API_KEY_VAR)
            .or_else(|| config.api_key.clone().filter(|key| !key.trim().is_empty()))
            .ok_or(TickError::ConfigurationMissing)?;

        let request = DepartureBoardQuery::new(&tracking.station_name, config.departure_limit())
            .to_request(&self.golemio, &api_key)
            .map_err(|e| TickError::Internal {
                message: e.to_string(),
            })?;
        debug!(url = %request.url, "fetching departures");

        let response = self
            .fetcher
            .get(&request)
            .await
            .map_err(|e| TickError::Transport {
                url: request.url.clone(),
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(TickError::UpstreamStatus {
                status: response.status,
                url: request.url,
            });
        }

        let board: DepartureBoard =
            serde_json::from_str(&response.body).map_err(|e| TickError::Decode {
                message: e.to_string(),
            })?;

        let departures = board.departures();
        if departures.is_empty() {
            return Err(TickError::EmptyUpstream);
        }

        let matched = match_departures(departures, &tracking);
        let Some(&current) = matched.first() else {
            return Err(TickError::NoMatch(NoMatch::describe(departures, &tracking)));
        };

        let state = ArrivalState::from_departures(current, matched.get(1).copied(), Local::now());
        debug!(
            station = %tracking.station_name,
            line = state.line_number(),
            minutes = ?state.minutes_to_arrival(),
            "departure matched"
        );
        Ok(state)
    }

    fn note_interval(&self, configured: Duration) {
        self.interval.send_if_modified(|current| {
            if *current == configured {
                false
            } else {
                *current = configured;
                true
            }
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}
