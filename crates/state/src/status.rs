//! Summary of a branch's position, published to the rest of the node.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use azurite_primitives::{Epoch, Height};

use crate::branch::{BranchState, ForkId};

/// Compact view of the current branch for status surfaces and the
/// surrounding protocol layer.  Always produced from a fully formed
/// [`BranchState`], so observers see pre-reset or post-reset values, never a
/// mix.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct BranchStatus {
    /// Identity of the branch the rest of the fields describe.
    pub fork_id: ForkId,

    /// First height of the branch.
    pub origin_height: Height,

    /// Most recently recorded height.
    pub last_height: Height,

    /// Epoch the registers currently describe.
    pub cur_epoch: Epoch,
}

impl BranchStatus {
    pub fn from_branch(branch: &BranchState) -> Self {
        Self {
            fork_id: branch.fork_id(),
            origin_height: branch.ledger().origin_height(),
            last_height: branch.ledger().last_height(),
            cur_epoch: branch.cur_epoch(),
        }
    }
}
