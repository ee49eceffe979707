//! Request pacing
//!
//! Every request, whichever keyword run or detail task issues it, reserves
//! the next free start slot. Slots are at least `interval` apart, so the
//! retailer sees a steady request rate no matter how many workers run.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between request starts
#[derive(Debug)]
pub struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits until this caller's start slot arrives
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let slot = self.reserve(Instant::now());
        tokio::time::sleep_until(slot).await;
    }

    /// Reserves the next slot at or after `now` and returns it
    fn reserve(&self, now: Instant) -> Instant {
        let mut next = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match *next {
            Some(free) if free > now => free,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
