//! Branch identity and the owned per-branch state bundle.

use std::fmt;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use azurite_primitives::{epoch, Epoch, Height};

use crate::ledger::StateLedger;
use crate::register::EpochRegister;
use crate::valset::ValidatorSet;

/// Identity of a branch, carried on all consensus-layer messages and
/// persisted records so participants can tell branches apart.
///
/// This is the L1 epoch identifier of the stale update that forced the
/// branch into existence.  L1 epochs are monotonic and globally ordered, so
/// these are unique across the chain's lifetime.  Zero is the initial,
/// never-forked chain identity.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Serialize,
    Deserialize,
)]
pub struct ForkId(u64);

impl ForkId {
    /// The identity of the chain before any fork has happened.
    pub fn base() -> Self {
        Self(0)
    }

    pub fn from_l1_epoch(epoch: Epoch) -> Self {
        Self(epoch)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ForkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fork{}", self.0)
    }
}

/// The externally supplied `(H0, S(H0))` pair a branch starts from.  This is
/// the only state injected from outside rather than derived.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Serialize, Deserialize)]
pub struct BranchGenesis {
    origin_height: Height,
    valset: ValidatorSet,
}

impl BranchGenesis {
    pub fn new(origin_height: Height, valset: ValidatorSet) -> Self {
        Self {
            origin_height,
            valset,
        }
    }

    pub fn origin_height(&self) -> Height {
        self.origin_height
    }

    pub fn valset(&self) -> &ValidatorSet {
        &self.valset
    }

    pub fn into_parts(self) -> (Height, ValidatorSet) {
        (self.origin_height, self.valset)
    }
}

/// All mutable consensus state of one branch, owned as a single value that's
/// passed into transitions and replaced wholesale on fork.  There are no
/// ambient globals behind this.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Serialize, Deserialize)]
pub struct BranchState {
    /// Identity of this branch.
    fork_id: ForkId,

    /// Height-indexed validator-set state variable.
    ledger: StateLedger,

    /// Active/staged epoch registers.
    register: EpochRegister,
}

impl BranchState {
    /// Assembles the state of a fresh branch from its genesis input.  Both
    /// registers seed from the genesis set per the delayed-activation rule.
    pub fn from_genesis(fork_id: ForkId, genesis: BranchGenesis, epoch_len: u64) -> Self {
        let (origin_height, valset) = genesis.into_parts();
        let origin_epoch = epoch::epoch_of(origin_height, epoch_len);
        let register = EpochRegister::new_at_genesis(origin_epoch, valset.clone());
        let ledger = StateLedger::new_at_genesis(origin_height, valset);

        Self {
            fork_id,
            ledger,
            register,
        }
    }

    pub fn fork_id(&self) -> ForkId {
        self.fork_id
    }

    pub fn ledger(&self) -> &StateLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut StateLedger {
        &mut self.ledger
    }

    pub fn register(&self) -> &EpochRegister {
        &self.register
    }

    pub fn register_mut(&mut self) -> &mut EpochRegister {
        &mut self.register
    }

    /// Epoch the registers currently describe.
    pub fn cur_epoch(&self) -> Epoch {
        self.register.epoch()
    }

    /// The set effective for the current epoch.
    pub fn active_set(&self) -> &ValidatorSet {
        self.register.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valset::ValidatorEntry;
    use azurite_primitives::buf::Buf32;

    #[test]
    fn test_branch_seeding() {
        let valset =
            ValidatorSet::from_entries([ValidatorEntry::new(Buf32::from([1; 32]), 10)]);
        let genesis = BranchGenesis::new(7, valset.clone());
        let branch = BranchState::from_genesis(ForkId::base(), genesis, 3);

        // Height 7 is in epoch 2 with epoch length 3.
        assert_eq!(branch.cur_epoch(), 2);
        assert_eq!(branch.active_set(), &valset);
        assert_eq!(branch.register().staged(), &valset);
        assert_eq!(branch.ledger().origin_height(), 7);
        assert_eq!(branch.ledger().genesis(), &valset);
    }

    #[test]
    fn test_fork_id_ordering() {
        assert!(ForkId::from_l1_epoch(4) > ForkId::base());
        assert_eq!(format!("{}", ForkId::from_l1_epoch(4)), "fork4");
    }
}
