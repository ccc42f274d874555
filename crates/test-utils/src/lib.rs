//! Shared helpers for unit tests across the workspace.

use std::cell::Cell;

use arbitrary::{Arbitrary, Unstructured};
use rand::{rngs::OsRng, RngCore};

pub mod clock;

pub use clock::ManualClock;

/// Entropy pool size.  Large enough that a test never drains it.
const ARB_GEN_LEN: usize = 1 << 20; // 1 MiB

/// Produces arbitrary instances from a pre-filled random buffer, advancing
/// through it so consecutive calls give unrelated values.
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
    off: Cell<usize>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    pub fn new_with_size(n: usize) -> Self {
        let mut buf = vec![0; n];
        OsRng.fill_bytes(&mut buf);
        Self {
            buf,
            off: Cell::new(0),
        }
    }

    pub fn generate<'a, T: Arbitrary<'a>>(&'a self) -> T {
        let remaining = &self.buf[self.off.get()..];
        let mut u = Unstructured::new(remaining);
        let before = u.len();
        let inst = T::arbitrary(&mut u).expect("testutils: generate arbitrary instance");
        self.off.set(self.off.get() + (before - u.len()));
        inst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_advances_cursor() {
        let ag = ArbitraryGenerator::new_with_size(1024);
        let _: u64 = ag.generate();
        let _: u64 = ag.generate();
        assert!(ag.off.get() >= 16);
    }
}
