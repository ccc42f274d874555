//! Epoch arithmetic.
//!
//! All of the height/epoch conversions live here so that every crate agrees on
//! the mapping.  These are pure functions of their arguments, the epoch length
//! comes from [`crate::params::RollupParams`] and does not change for the
//! lifetime of a branch.

use crate::{Epoch, Height};

/// Returns the epoch that a height belongs to.
pub fn epoch_of(height: Height, epoch_len: u64) -> Epoch {
    height / epoch_len
}

/// Returns the first height of an epoch.
pub fn first_of(epoch: Epoch, epoch_len: u64) -> Height {
    epoch * epoch_len
}

/// Returns the last height of an epoch.
pub fn last_of(epoch: Epoch, epoch_len: u64) -> Height {
    first_of(epoch + 1, epoch_len) - 1
}

/// Returns if a height is the first height of its epoch.
pub fn is_epoch_boundary(height: Height, epoch_len: u64) -> bool {
    height % epoch_len == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_of_matches_div() {
        for epoch_len in [1, 3, 10, 64] {
            for height in 0..200 {
                assert_eq!(epoch_of(height, epoch_len), height / epoch_len);
            }
        }
    }

    #[test]
    fn test_height_within_own_epoch_bounds() {
        for epoch_len in [1, 3, 10, 64] {
            for height in 0..200 {
                let e = epoch_of(height, epoch_len);
                assert!(first_of(e, epoch_len) <= height);
                assert!(height <= last_of(e, epoch_len));
            }
        }
    }

    #[test]
    fn test_epoch_bounds_adjacent() {
        let epoch_len = 7;
        for e in 0..20 {
            assert_eq!(last_of(e, epoch_len) + 1, first_of(e + 1, epoch_len));
            assert!(is_epoch_boundary(first_of(e, epoch_len), epoch_len));
            assert!(!is_epoch_boundary(last_of(e, epoch_len), epoch_len) || epoch_len == 1);
        }
    }
}
