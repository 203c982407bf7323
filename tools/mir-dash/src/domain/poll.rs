//! Single-flight guard for status polls.
//!
//! Timer ticks and manual refreshes both try to start a poll. Only one may be
//! in flight; overlapping attempts are skipped rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Poll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
}

/// Shared guard. Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct PollGuard {
    in_flight: Arc<AtomicBool>,
}

impl PollGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PollState {
        if self.in_flight.load(Ordering::Acquire) {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    /// Move from `Idle` to `Polling`. Returns `None` if a poll is already
    /// in flight.
    pub fn try_begin(&self) -> Option<PollTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PollTicket {
                in_flight: Arc::clone(&self.in_flight),
            })
    }
}

/// Proof that the holder owns the in-flight poll. Dropping it returns the
/// guard to `Idle`, whether the poll succeeded, failed or was cancelled.
#[derive(Debug)]
pub struct PollTicket {
    in_flight: Arc<AtomicBool>,
}

impl PollTicket {
    pub fn finish(self) {}
}

impl Drop for PollTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
