//! # Clock Provider
//!
//! Resolves "now" for a single request. The result is passed explicitly into
//! every engine call; nothing here mutates shared state on a request's behalf.

use crate::traits::Clock;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Used by tests and demos.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Picks the override verbatim when it parses as an integer, else asks the clock.
///
/// The override is deliberately unvalidated beyond parsing: negative or far
/// future values are accepted as given.
pub fn resolve_now(clock: &dyn Clock, override_ms: Option<&str>) -> i64 {
    match override_ms.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(now) => now,
        None => clock.now_ms(),
    }
}
