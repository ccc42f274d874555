//! The bridge surface the rotation core consumes.

use azurite_primitives::{Height, Timestamp};
use azurite_state::update::{UpdateBatch, ValidatorSetUpdate};
use azurite_state::valset::ValidatorSet;

use crate::errors::BridgeError;
use crate::proof::BlockProof;

/// Abstraction over the external L1 ledger.
///
/// Implementations are expected to be driven by a single writer (the
/// rotation worker); the methods take explicit timestamps so the core stays
/// deterministic and time only enters through the caller's clock.
pub trait L1Bridge {
    /// Outstanding update events not yet included in a proven L2 block, in
    /// the order of their original L1 commitment.  The block-producing
    /// collaborator assembles `updates(H)` from this.
    fn pending_updates(&self) -> UpdateBatch;

    /// Every update not yet completed by an acknowledgement, regardless of
    /// inclusion status, in original L1 order.
    fn outstanding_updates(&self) -> UpdateBatch;

    /// The time by which an update's inclusion must be acknowledged.  All
    /// updates sharing an originating L1 epoch share the same deadline.
    fn deadline_for(&self, update: &ValidatorSetUpdate) -> Timestamp;

    /// Outstanding updates whose deadline is at or before `now`, in
    /// original L1 order.
    fn stale_updates(&self, now: Timestamp) -> UpdateBatch;

    /// Hands a block proof to the verifier contract.  Succeeds only if the
    /// producer is in the expected set for the block's epoch and the parent
    /// was signed by its own expected set.  Rejection is terminal for this
    /// proof.
    fn submit_proof(&mut self, proof: &BlockProof) -> Result<(), BridgeError>;

    /// Marks the updates included in the (successfully proven) block at
    /// `height` as completed on L1, cancelling their deadlines and folding
    /// them into the accepted set.
    fn acknowledge(&mut self, height: Height) -> Result<(), BridgeError>;

    /// The validator set as L1 last accepted it, i.e. the genesis fold base
    /// for a forced fork.
    fn accepted_valset(&self) -> ValidatorSet;

    /// Height of the latest L2 block whose proof was both accepted and
    /// acknowledged, if any.
    fn last_accepted_height(&self) -> Option<Height>;
}
