//! Validator-set update records as they arrive from L1.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use azurite_primitives::{buf::Buf32, Epoch};

use crate::valset::{ValidatorId, VotingPower};

/// What an update does to the set.  Each variant touches exactly one
/// validator identity and overwrites rather than accumulates, so replaying
/// the same update is idempotent.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub enum UpdateKind {
    /// Adds a validator with the given power, overwriting any prior power.
    Register(VotingPower),

    /// Removes a validator from the set.
    Deregister,

    /// Overwrites a validator's power.  Zero removes it.
    SetPower(VotingPower),
}

/// Where an update came from on L1.  The epoch tag drives both the
/// acknowledgement deadline and, if things go wrong, the fork id.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct UpdateOrigin {
    /// Identifier of the originating L1 event source.
    source: Buf32,

    /// L1 epoch the update was committed in.
    l1_epoch: Epoch,
}

impl UpdateOrigin {
    pub fn new(source: Buf32, l1_epoch: Epoch) -> Self {
        Self { source, l1_epoch }
    }

    pub fn source(&self) -> &Buf32 {
        &self.source
    }

    pub fn l1_epoch(&self) -> Epoch {
        self.l1_epoch
    }
}

/// A single validator-set update event originating from L1.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct ValidatorSetUpdate {
    /// The validator the update is keyed by.
    id: ValidatorId,

    /// The operation to perform.
    kind: UpdateKind,

    /// L1 provenance.
    origin: UpdateOrigin,
}

impl ValidatorSetUpdate {
    pub fn new(id: ValidatorId, kind: UpdateKind, origin: UpdateOrigin) -> Self {
        Self { id, kind, origin }
    }

    pub fn id(&self) -> &ValidatorId {
        &self.id
    }

    pub fn kind(&self) -> &UpdateKind {
        &self.kind
    }

    pub fn origin(&self) -> &UpdateOrigin {
        &self.origin
    }
}

/// The ordered sequence of updates carried in a single committed block.
///
/// Order is the order of original L1 commitment and is consensus-relevant,
/// the fold over the previous set depends on it.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct UpdateBatch {
    updates: Vec<ValidatorSetUpdate>,
}

impl UpdateBatch {
    pub fn new(updates: Vec<ValidatorSetUpdate>) -> Self {
        Self { updates }
    }

    pub fn new_empty() -> Self {
        Self {
            updates: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn updates(&self) -> &[ValidatorSetUpdate] {
        &self.updates
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatorSetUpdate> {
        self.updates.iter()
    }

    pub fn into_updates(self) -> Vec<ValidatorSetUpdate> {
        self.updates
    }

    /// The highest L1 epoch tag among the carried updates, if any.
    pub fn max_l1_epoch(&self) -> Option<Epoch> {
        self.updates.iter().map(|u| u.origin().l1_epoch()).max()
    }
}

impl FromIterator<ValidatorSetUpdate> for UpdateBatch {
    fn from_iter<T: IntoIterator<Item = ValidatorSetUpdate>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
