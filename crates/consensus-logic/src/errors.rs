use thiserror::Error;

use azurite_l1_bridge::errors::BridgeError;
use azurite_primitives::Height;
use azurite_rotation::errors::TsnError;
use azurite_state::branch::ForkId;

use crate::reconcile::ReconcileError;

#[derive(Debug, Error)]
pub enum Error {
    /// A block arrived while a fork is pending; the old branch is dead and
    /// must not be extended.
    #[error("branch suspended pending fork (block at height {0})")]
    BranchSuspended(Height),

    /// Reset called without an observed trigger.
    #[error("no fork pending")]
    NoForkPending,

    /// A reset fired but the bridge has no uncompleted updates to derive a
    /// fork identity from.
    #[error("no outstanding updates to derive fork id from")]
    NothingStale,

    /// The derived fork id doesn't advance past the current branch, which
    /// would break fork-id uniqueness.
    #[error("fork id {new} does not advance past {cur}")]
    NonMonotonicForkId { cur: ForkId, new: ForkId },

    #[error("reconcile: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("transition: {0}")]
    Tsn(#[from] TsnError),

    #[error("bridge: {0}")]
    Bridge(#[from] BridgeError),
}
