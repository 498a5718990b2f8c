//! Time sources for the log engine.
//!
//! The controller keeps wall-clock time without a zone; every timestamp in
//! the logs is that local wall time.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// A source of controller-local wall time.
pub trait Clock: Send + Sync {
    fn now(&self) -> PrimitiveDateTime;
}

/// Clock backed by the host's local time, falling back to UTC when the
/// local offset cannot be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// A settable clock. Clones share the same time, so a test can keep a
/// handle and move time forward after giving the clock to a logger.
#[derive(Debug, Clone)]
pub struct ManualClock {
    seconds: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(at: PrimitiveDateTime) -> Self {
        Self {
            seconds: Arc::new(AtomicI64::new(epoch_seconds(at))),
        }
    }

    pub fn set(&self, at: PrimitiveDateTime) {
        self.seconds.store(epoch_seconds(at), Ordering::Relaxed);
    }

    pub fn advance(&self, by: Duration) {
        self.seconds.fetch_add(by.whole_seconds(), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> PrimitiveDateTime {
        let at = OffsetDateTime::from_unix_timestamp(self.seconds.load(Ordering::Relaxed))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        PrimitiveDateTime::new(at.date(), at.time())
    }
}

/// Seconds since the epoch of a wall-clock time, reading it as if it were UTC.
pub fn epoch_seconds(at: PrimitiveDateTime) -> i64 {
    at.assume_utc().unix_timestamp()
}
