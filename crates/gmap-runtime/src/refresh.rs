#![forbid(unsafe_code)]

//! Refresh sequencing.
//!
//! Every fetch carries a ticket with a monotonically increasing sequence
//! number. Only the newest issued ticket may replace the snapshot: a
//! completion for an older ticket is discarded, whether it succeeded or
//! failed. While a fetch is outstanding the last good snapshot keeps
//! rendering.

use core::time::Duration;

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket {
    seq: u64,
}

impl FetchTicket {
    /// Sequence number; later tickets compare greater.
    #[inline]
    pub const fn seq(self) -> u64 {
        self.seq
    }
}

/// User-visible state of the data feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefreshStatus {
    /// No fetch outstanding and the last one succeeded (or none ran yet).
    #[default]
    Idle,
    /// The newest fetch has not completed.
    Loading,
    /// The newest fetch failed; the previous snapshot is still shown.
    Failed(String),
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The payload became the current snapshot with this revision.
    Applied { revision: u64 },
    /// A newer fetch was issued (or already applied); the result was dropped.
    Stale { seq: u64, latest: u64 },
    /// The newest fetch failed.
    Failed,
}

/// Issues tickets and decides which completions win.
#[derive(Debug, Clone, Default)]
pub struct RefreshTracker {
    latest: u64,
    settled: u64,
    status: RefreshStatus,
}

impl RefreshTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket; it supersedes every earlier one.
    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        self.status = RefreshStatus::Loading;
        FetchTicket { seq: self.latest }
    }

    /// Whether the newest ticket has not completed yet.
    #[inline]
    pub fn in_flight(&self) -> bool {
        self.settled < self.latest
    }

    #[inline]
    pub fn status(&self) -> &RefreshStatus {
        &self.status
    }

    /// Newest issued sequence number (0 before the first fetch).
    #[inline]
    pub fn latest_seq(&self) -> u64 {
        self.latest
    }

    /// Whether a completion for `ticket` should be applied.
    ///
    /// Only the newest ticket, and only once.
    pub fn accepts(&self, ticket: FetchTicket) -> bool {
        ticket.seq == self.latest && ticket.seq > self.settled
    }

    /// Record a completion and classify it.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<(), String>) -> RefreshOutcome {
        if !self.accepts(ticket) {
            return RefreshOutcome::Stale {
                seq: ticket.seq,
                latest: self.latest,
            };
        }
        self.settled = ticket.seq;
        match result {
            Ok(()) => {
                self.status = RefreshStatus::Idle;
                RefreshOutcome::Applied {
                    revision: ticket.seq,
                }
            }
            Err(message) => {
                self.status = RefreshStatus::Failed(message);
                RefreshOutcome::Failed
            }
        }
    }
}

/// Fixed-interval poll schedule on the host's monotonic clock.
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    last: Option<Duration>,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a poll is due at `now`. Always due before the first poll.
    /// A zero interval never polls.
    pub fn is_due(&self, now: Duration) -> bool {
        if self.interval.is_zero() {
            return false;
        }
        self.last
            .is_none_or(|last| now.saturating_sub(last) >= self.interval)
    }

    /// Time since the last fetch started, or `None` before the first.
    pub fn since_last(&self, now: Duration) -> Option<Duration> {
        self.last.map(|last| now.saturating_sub(last))
    }

    /// Record that a fetch started at `now`.
    pub fn mark(&mut self, now: Duration) {
        self.last = Some(now);
    }
}
