//! Controllable clock for deadline tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use azurite_l1_bridge::clock::Clock;
use azurite_primitives::Timestamp;

/// A clock that only moves when the test says so.  Clones share the same
/// underlying instant, so a test can hold one half while a worker task owns
/// the other.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        self.now.store(ts, Ordering::Relaxed);
    }

    pub fn advance(&self, by: u64) {
        self.now.fetch_add(by, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::Relaxed)
    }
}
