//! Poll timing.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Whether a fetch is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Timer armed, nothing in flight.
    Idle,
    /// One fetch in flight; further ticks are dropped.
    Fetching,
}

/// What happened to a requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The pipeline ran and a new state was published.
    Completed,
    /// Another fetch was in flight, so this tick did nothing.
    Skipped,
}

/// Result of comparing the running timer against the configured interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalChange {
    Unchanged,
    /// Re-arm the timer with this period.
    Changed(Duration),
}

impl IntervalChange {
    /// Compare the active period with the configured one.
    ///
    /// A zero configured period is treated as one second.
    pub fn between(active: Duration, configured: Duration) -> Self {
        let configured = configured.max(Duration::from_secs(1));
        if configured == active {
            IntervalChange::Unchanged
        } else {
            IntervalChange::Changed(configured)
        }
    }
}

/// A timer firing every `period`, first at `start`.
///
/// Ticks missed while the runtime was busy are not burst-replayed.
pub fn ticker(start: Instant, period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
