//! Epoch-scoped active/staged validator set registers.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use azurite_primitives::Epoch;

use crate::valset::ValidatorSet;

/// The two live epoch-scoped values: the set in force during the current
/// epoch and the set already staged to take over at the next boundary.
///
/// The registers only ever move at epoch boundaries, which keeps the active
/// set constant for every height inside an epoch.  Rolling them over at any
/// other point is a bug in the caller, not a recoverable condition.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct EpochRegister {
    /// Epoch the registers currently describe.
    epoch: Epoch,

    /// Set effective throughout `epoch`.
    active: ValidatorSet,

    /// Set staged to become active at epoch `epoch + 1`.
    staged: ValidatorSet,
}

impl EpochRegister {
    /// Seeds both registers from the branch genesis set.  Until enough
    /// epochs have elapsed for the two-epoch delay to produce something
    /// different, the active set stays the genesis set.
    pub fn new_at_genesis(epoch: Epoch, genesis: ValidatorSet) -> Self {
        Self {
            epoch,
            active: genesis.clone(),
            staged: genesis,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn active(&self) -> &ValidatorSet {
        &self.active
    }

    pub fn staged(&self) -> &ValidatorSet {
        &self.staged
    }

    /// Executes the boundary transition into `next_epoch`: the staged set
    /// becomes active and `new_staged` takes its place.
    ///
    /// # Panics
    ///
    /// If `next_epoch` is not the direct successor of the current epoch.
    pub fn rollover(&mut self, next_epoch: Epoch, new_staged: ValidatorSet) {
        if next_epoch != self.epoch + 1 {
            panic!(
                "epochregister: non-sequential rollover {} -> {next_epoch}",
                self.epoch
            );
        }

        self.active = std::mem::replace(&mut self.staged, new_staged);
        self.epoch = next_epoch;
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
    fn test_genesis_registers_equal() {
        let reg = EpochRegister::new_at_genesis(2, set_with_power(7));
        assert_eq!(reg.epoch(), 2);
        assert_eq!(reg.active(), reg.staged());
    }

    #[test]
    fn test_rollover_promotes_staged() {
        let mut reg = EpochRegister::new_at_genesis(0, set_with_power(1));
        reg.rollover(1, set_with_power(2));
        assert_eq!(reg.epoch(), 1);
        assert_eq!(reg.active(), &set_with_power(1));
        assert_eq!(reg.staged(), &set_with_power(2));

        reg.rollover(2, set_with_power(3));
        assert_eq!(reg.active(), &set_with_power(2));
        assert_eq!(reg.staged(), &set_with_power(3));
    }

    #[test]
    #[should_panic(expected = "epochregister: non-sequential rollover")]
    fn test_rollover_skipping_epoch_panics() {
        let mut reg = EpochRegister::new_at_genesis(0, set_with_power(1));
        reg.rollover(2, set_with_power(2));
    }
}
