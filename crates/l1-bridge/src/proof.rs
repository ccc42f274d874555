//! Proof summary the verifier contract judges blocks by.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use azurite_primitives::Height;
use azurite_state::update::UpdateBatch;
use azurite_state::valset::ValidatorId;

/// What the rotation protocol sees of an L2 block proof.  The actual
/// validity-proof bytes are constructed and checked elsewhere; the fields
/// here are the public inputs the contract's validator-set enforcement acts
/// on.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Serialize, Deserialize)]
pub struct BlockProof {
    /// Height of the proven block.
    height: Height,

    /// Validator that produced the block.
    producer: ValidatorId,

    /// Height of the parent block the proof links back to.
    parent_height: Height,

    /// Validators whose signatures justify the parent block.
    parent_signers: Vec<ValidatorId>,

    /// Validator-set updates the proven block carried, in block order.  The
    /// contract marks these complete on acknowledgement.
    updates: UpdateBatch,
}

impl BlockProof {
    pub fn new(
        height: Height,
        producer: ValidatorId,
        parent_height: Height,
        parent_signers: Vec<ValidatorId>,
        updates: UpdateBatch,
    ) -> Self {
        Self {
            height,
            producer,
            parent_height,
            parent_signers,
            updates,
        }
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn producer(&self) -> &ValidatorId {
        &self.producer
    }

    pub fn parent_height(&self) -> Height {
        self.parent_height
    }

    pub fn parent_signers(&self) -> &[ValidatorId] {
        &self.parent_signers
    }

    pub fn updates(&self) -> &UpdateBatch {
        &self.updates
    }
}
