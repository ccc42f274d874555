//! Time source for deadline checks.
//!
//! The transition logic never reads the wall clock directly; whatever drives
//! it pulls a timestamp from here and passes it down.  Tests substitute
//! fixed timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

use azurite_primitives::Timestamp;

pub trait Clock {
    /// Current unix millis.
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock: before unix epoch")
            .as_millis() as u64
    }
}
