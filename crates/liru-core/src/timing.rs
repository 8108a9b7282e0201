//! Monotonic clock abstraction and delta measurement.
//!
//! Both session roles time their transport calls through [`measure`], so
//! latency and cadence are computed identically on each side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic instants.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Process monotonic clock (`Instant::now`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock. Clones share the same offset.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::Relaxed))
    }
}

/// Milliseconds between two instants; zero if `end` precedes `start`.
pub fn elapsed_ms(start: Instant, end: Instant) -> f64 {
    end.saturating_duration_since(start).as_secs_f64() * 1000.0
}

/// Outcome of a timed call.
#[derive(Debug, Clone, Copy)]
pub struct Timed<R> {
    pub value: R,
    pub elapsed_ms: f64,
    pub finished_at: Instant,
}

/// Run `f` and record the wall-clock delta around it.
pub fn measure<C, R, F>(clock: &C, f: F) -> Timed<R>
where
    C: Clock + ?Sized,
    F: FnOnce() -> R,
{
    let start = clock.now();
    let value = f();
    let finished_at = clock.now();
    Timed {
        value,
        elapsed_ms: elapsed_ms(start, finished_at),
        finished_at,
    }
}
