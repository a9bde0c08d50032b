//! Single-writer coalescing scheduler for reconciliation passes.
//!
//! This is not a work queue: requests carry no payload, so any number of
//! them arriving while a pass is pending collapse into one follow-up pass
//! that reads the latest session state.
//!
//! ```text
//!            request                       request
//!   Idle ───────────────► Pending ───────────────────► PendingQueued
//!    ▲  (schedule after      │  complete                    │ complete
//!    │   computed delay)     ▼                              ▼
//!    └──────────────────── Idle ◄── re-issue one request ── Idle
//! ```
//!
//! The scheduler is a pure state machine over caller-supplied instants; the
//! async driver owns the clock.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A pass is scheduled or running.
    Pending,
    /// A pass is scheduled or running and at least one more was requested.
    PendingQueued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    pub requests:   u64,
    pub scheduled:  u64,
    /// Requests absorbed by an already pending pass.
    pub coalesced:  u64,
    pub follow_ups: u64,
}

#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    state:           SchedulerState,
    min_interval:    Duration,
    last_completion: Option<Instant>,
    stats:           SchedulerStats,
}

impl UpdateScheduler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            min_interval,
            last_completion: None,
            stats: SchedulerStats::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Remaining quiescence before a pass may start at `now`. Never negative.
    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_completion {
            Some(done) => self.min_interval.saturating_sub(now.saturating_duration_since(done)),
            None => Duration::ZERO,
        }
    }

    /// Records a request. Returns the delay after which the caller must run a
    /// pass, or `None` when the request was merged into a pending one.
    pub fn request(&mut self, now: Instant) -> Option<Duration> {
        self.stats.requests += 1;
        match self.state {
            SchedulerState::Idle => {
                let delay = self.delay_at(now);
                self.state = SchedulerState::Pending;
                self.stats.scheduled += 1;
                trace!("[Scheduler] pass scheduled in {:?}", delay);
                Some(delay)
            }
            SchedulerState::Pending | SchedulerState::PendingQueued => {
                self.state = SchedulerState::PendingQueued;
                self.stats.coalesced += 1;
                None
            }
        }
    }

    /// Records completion of the running pass at `now`.
    ///
    /// If requests were merged meanwhile, exactly one new request is issued
    /// and its delay returned.
    pub fn complete(&mut self, now: Instant) -> Option<Duration> {
        self.last_completion = Some(now);
        let previous = std::mem::replace(&mut self.state, SchedulerState::Idle);
        if previous == SchedulerState::PendingQueued {
            self.stats.follow_ups += 1;
            self.request(now)
        } else {
            None
        }
    }
}
