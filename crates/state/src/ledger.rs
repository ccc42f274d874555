//! Append-only, height-indexed record of the validator-set state variable.
//!
//! Entries are indexed by absolute height starting from the branch origin,
//! backed by a plain vec so the structure stays easily serializable.  The
//! entry at the origin height is the externally supplied branch genesis and
//! is never re-derived.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use azurite_primitives::{epoch, Epoch, Height};

use crate::valset::ValidatorSet;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum LedgerError {
    /// Indicates a sequencing bug upstream, callers must not retry.
    #[error("appended height {got} out of order (expected {expected})")]
    OutOfOrderAppend { expected: Height, got: Height },

    #[error("no state recorded at height {0}")]
    NotFound(Height),
}

#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct StateLedger {
    /// First height of this branch, where the genesis entry sits.
    origin_height: Height,

    /// One state entry per height, starting at `origin_height`.  Never
    /// empty, the first entry is the branch genesis.
    entries: Vec<ValidatorSet>,
}

impl StateLedger {
    /// Creates a ledger for a new branch, seeding the genesis entry.  This
    /// is the only way state enters a branch from outside.
    pub fn new_at_genesis(origin_height: Height, genesis: ValidatorSet) -> Self {
        Self {
            origin_height,
            entries: vec![genesis],
        }
    }

    /// First height of the current branch.
    pub fn origin_height(&self) -> Height {
        self.origin_height
    }

    /// Highest height with a recorded entry.
    pub fn last_height(&self) -> Height {
        self.origin_height + self.entries.len() as u64 - 1
    }

    /// The height the next append must use.
    pub fn next_height(&self) -> Height {
        self.last_height() + 1
    }

    /// The branch genesis entry.
    pub fn genesis(&self) -> &ValidatorSet {
        self.entries.first().expect("ledger: missing genesis entry")
    }

    /// The most recently recorded entry.
    pub fn head(&self) -> &ValidatorSet {
        self.entries.last().expect("ledger: missing genesis entry")
    }

    /// Records the state value at a height.  The height must be exactly one
    /// past the last recorded height.
    pub fn append(&mut self, height: Height, state: ValidatorSet) -> Result<(), LedgerError> {
        let expected = self.next_height();
        if height != expected {
            return Err(LedgerError::OutOfOrderAppend {
                expected,
                got: height,
            });
        }

        self.entries.push(state);
        Ok(())
    }

    /// Returns the recorded state at a height.
    pub fn get(&self, height: Height) -> Result<&ValidatorSet, LedgerError> {
        if height < self.origin_height || height > self.last_height() {
            return Err(LedgerError::NotFound(height));
        }

        let off = (height - self.origin_height) as usize;
        Ok(&self.entries[off])
    }

    /// Returns the state at the last height of an epoch, falling back to the
    /// branch genesis when that height predates the branch or hasn't been
    /// recorded.  Lookups into the past are total by design, this never
    /// errors.
    pub fn last_of_epoch(&self, e: Epoch, epoch_len: u64) -> &ValidatorSet {
        let h = epoch::last_of(e, epoch_len);
        self.get(h).unwrap_or_else(|_| self.genesis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valset::ValidatorEntry;
    use azurite_primitives::buf::Buf32;

    fn set_with_power(power: u64) -> ValidatorSet {
        ValidatorSet::from_entries([ValidatorEntry::new(Buf32::from([1; 32]), power)])
    }

    #[test]
    fn test_genesis_seeding() {
        let ledger = StateLedger::new_at_genesis(10, set_with_power(5));
        assert_eq!(ledger.origin_height(), 10);
        assert_eq!(ledger.last_height(), 10);
        assert_eq!(ledger.genesis(), &set_with_power(5));
        assert_eq!(ledger.get(10).expect("test: get"), &set_with_power(5));
    }

    #[test]
    fn test_append_in_order() {
        let mut ledger = StateLedger::new_at_genesis(0, set_with_power(1));
        ledger.append(1, set_with_power(2)).expect("test: append");
        ledger.append(2, set_with_power(3)).expect("test: append");
        assert_eq!(ledger.last_height(), 2);
        assert_eq!(ledger.get(2).expect("test: get"), &set_with_power(3));
        assert_eq!(ledger.head(), &set_with_power(3));
    }

    #[test]
    fn test_append_out_of_order() {
        let mut ledger = StateLedger::new_at_genesis(0, set_with_power(1));
        let res = ledger.append(2, set_with_power(2));
        assert_eq!(
            res,
            Err(LedgerError::OutOfOrderAppend {
                expected: 1,
                got: 2
            })
        );

        // Re-appending the genesis height is just as wrong.
        let res = ledger.append(0, set_with_power(2));
        assert!(matches!(res, Err(LedgerError::OutOfOrderAppend { .. })));
    }

    #[test]
    fn test_get_out_of_range() {
        let ledger = StateLedger::new_at_genesis(5, set_with_power(1));
        assert_eq!(ledger.get(4), Err(LedgerError::NotFound(4)));
        assert_eq!(ledger.get(6), Err(LedgerError::NotFound(6)));
    }

    #[test]
    fn test_last_of_epoch_recorded() {
        // Epoch len 3, origin at 0.  Epoch 1 ends at height 5.
        let mut ledger = StateLedger::new_at_genesis(0, set_with_power(1));
        for h in 1..=5 {
            ledger
                .append(h, set_with_power(h as u64 + 1))
                .expect("test: append");
        }
        assert_eq!(ledger.last_of_epoch(1, 3), &set_with_power(6));
        assert_eq!(ledger.last_of_epoch(0, 3), &set_with_power(3));
    }

    #[test]
    fn test_last_of_epoch_falls_back_to_genesis() {
        // Origin at height 3, so epoch 0 (heights 0..=2) predates the branch.
        let mut ledger = StateLedger::new_at_genesis(3, set_with_power(9));
        ledger.append(4, set_with_power(10)).expect("test: append");

        assert_eq!(ledger.last_of_epoch(0, 3), &set_with_power(9));

        // Epoch 1 ends at height 5 which isn't recorded yet either.
        assert_eq!(ledger.last_of_epoch(1, 3), &set_with_power(9));
    }
}
