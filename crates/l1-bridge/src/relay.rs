//! In-memory bridge implementation.
//!
//! Stands in for the real L1 contract in tests and local runs.  It keeps the
//! same bookkeeping the contract does: the queue of uncompleted updates, the
//! deadline schedule, the per-epoch sets the verifier enforces, and the
//! validator set implied by everything acknowledged so far.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::*;

use azurite_primitives::{epoch, params::Params, Epoch, Height, Timestamp};
use azurite_rotation::transition::apply_updates;
use azurite_state::update::{UpdateBatch, ValidatorSetUpdate};
use azurite_state::valset::ValidatorSet;

use crate::errors::{BridgeError, RejectReason};
use crate::proof::BlockProof;
use crate::traits::L1Bridge;

pub struct RelayBridge {
    params: Arc<Params>,

    /// Updates committed on L1 and not yet completed by an ack, in
    /// commitment order.
    queue: Vec<ValidatorSetUpdate>,

    /// Batches from accepted proofs awaiting acknowledgement.
    proven: BTreeMap<Height, UpdateBatch>,

    /// The set implied by all acknowledged updates.
    accepted: ValidatorSet,

    /// Height of the last acknowledged block.
    last_accepted: Option<Height>,

    /// Per-epoch sets the verifier expects blocks to be produced and signed
    /// under.  Epochs without an entry fall back to the accepted set.
    expected: BTreeMap<Epoch, ValidatorSet>,
}

impl RelayBridge {
    pub fn new(params: Arc<Params>, genesis_valset: ValidatorSet) -> Self {
        Self {
            params,
            queue: Vec::new(),
            proven: BTreeMap::new(),
            accepted: genesis_valset,
            last_accepted: None,
            expected: BTreeMap::new(),
        }
    }

    /// Commits a new update event on the L1 side.
    pub fn push_update(&mut self, update: ValidatorSetUpdate) {
        self.queue.push(update);
    }

    /// Installs the set the verifier will enforce for an L2 epoch.
    pub fn set_expected(&mut self, e: Epoch, set: ValidatorSet) {
        self.expected.insert(e, set);
    }

    fn expected_for(&self, e: Epoch) -> &ValidatorSet {
        self.expected.get(&e).unwrap_or(&self.accepted)
    }

    fn is_included(&self, update: &ValidatorSetUpdate) -> bool {
        self.proven.values().any(|b| b.updates().contains(update))
    }
}

impl L1Bridge for RelayBridge {
    fn pending_updates(&self) -> UpdateBatch {
        self.queue
            .iter()
            .filter(|u| !self.is_included(u))
            .cloned()
            .collect()
    }

    fn outstanding_updates(&self) -> UpdateBatch {
        self.queue.iter().cloned().collect()
    }

    fn deadline_for(&self, update: &ValidatorSetUpdate) -> Timestamp {
        let due_epoch = update.origin().l1_epoch() + self.params.l1.ack_delay_epochs;
        self.params.l1.epoch_start(due_epoch)
    }

    fn stale_updates(&self, now: Timestamp) -> UpdateBatch {
        self.queue
            .iter()
            .filter(|u| self.deadline_for(u) <= now)
            .cloned()
            .collect()
    }

    fn submit_proof(&mut self, proof: &BlockProof) -> Result<(), BridgeError> {
        let height = proof.height();

        if let Some(accepted) = self.last_accepted {
            if height <= accepted {
                return Err(BridgeError::StaleProofHeight {
                    accepted,
                    got: height,
                });
            }
        }

        let epoch_len = self.params.rollup.epoch_len;

        let e = epoch::epoch_of(height, epoch_len);
        if !self.expected_for(e).is_member(proof.producer()) {
            warn!(%height, %e, "rejecting proof: unexpected producer");
            return Err(BridgeError::ProofRejected {
                height,
                reason: RejectReason::ProducerNotInSet(e),
            });
        }

        let parent_height = proof.parent_height();
        let pe = epoch::epoch_of(parent_height, epoch_len);
        let parent_set = self.expected_for(pe);
        if proof.parent_signers().is_empty()
            || !proof.parent_signers().iter().all(|s| parent_set.is_member(s))
        {
            warn!(%height, %parent_height, "rejecting proof: parent not justified");
            return Err(BridgeError::ProofRejected {
                height,
                reason: RejectReason::ParentNotJustified(parent_height),
            });
        }

        self.proven.insert(height, proof.updates().clone());
        Ok(())
    }

    fn acknowledge(&mut self, height: Height) -> Result<(), BridgeError> {
        if self.last_accepted.is_some_and(|la| height <= la) {
            return Err(BridgeError::AlreadyAcknowledged(height));
        }

        let batch = self
            .proven
            .remove(&height)
            .ok_or(BridgeError::UnknownHeight(height))?;

        // Completing the updates cancels their deadlines.
        for u in batch.iter() {
            if let Some(pos) = self.queue.iter().position(|q| q == u) {
                self.queue.remove(pos);
            }
        }

        self.accepted = apply_updates(&self.accepted, &batch);
        self.last_accepted = Some(height);

        debug!(%height, completed = batch.len(), "acknowledged block on L1");
        Ok(())
    }

    fn accepted_valset(&self) -> ValidatorSet {
        self.accepted.clone()
    }

    fn last_accepted_height(&self) -> Option<Height> {
        self.last_accepted
    }
}
