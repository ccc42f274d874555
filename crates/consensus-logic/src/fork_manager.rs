//! Enforcement-failure detection and branch reset.

use std::sync::Arc;

use tracing::*;

use azurite_l1_bridge::errors::BridgeError;
use azurite_l1_bridge::proof::BlockProof;
use azurite_l1_bridge::traits::L1Bridge;
use azurite_primitives::{params::Params, Height, Timestamp};
use azurite_rotation::transition::{apply_updates, process_block};
use azurite_state::branch::{BranchGenesis, BranchState, ForkId};
use azurite_state::status::BranchStatus;
use azurite_state::update::{UpdateBatch, ValidatorSetUpdate};

use crate::errors::Error;
use crate::reconcile::ReconcilePolicy;

/// The condition that forced a fork.  Both variants mean the same thing at
/// the protocol level: L2 fell off the schedule L1 enforces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForkTrigger {
    /// An update passed its acknowledgement deadline uncompleted.
    DeadlineExpired { update: ValidatorSetUpdate },

    /// The verifier refused a proof over a validator-set mismatch.
    ProofRejected { height: Height },
}

/// Where the branch is in its lifecycle.  A trigger moves it from `Active`
/// to `ForkPending`; the reset entry point is the only edge back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForkStage {
    Active,
    ForkPending(ForkTrigger),
}

/// Owns one branch's state and the bridge handle, watches for enforcement
/// failures, and performs the reset onto a new branch when one lands.
///
/// This is the single writer for the branch: block ingestion, proof
/// submission and resets all pass through here in height order.
pub struct ForkManager<B, P> {
    params: Arc<Params>,
    bridge: B,
    policy: P,
    branch: BranchState,
    stage: ForkStage,
}

impl<B: L1Bridge, P: ReconcilePolicy> ForkManager<B, P> {
    /// Starts managing a chain from its externally supplied genesis.
    pub fn new(params: Arc<Params>, bridge: B, policy: P, genesis: BranchGenesis) -> Self {
        let branch = BranchState::from_genesis(ForkId::base(), genesis, params.rollup.epoch_len);
        Self {
            params,
            bridge,
            policy,
            branch,
            stage: ForkStage::Active,
        }
    }

    pub fn branch(&self) -> &BranchState {
        &self.branch
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn stage(&self) -> &ForkStage {
        &self.stage
    }

    pub fn current_fork_id(&self) -> ForkId {
        self.branch.fork_id()
    }

    pub fn status(&self) -> BranchStatus {
        BranchStatus::from_branch(&self.branch)
    }

    /// Ingests a committed block, extending the ledger and rolling the
    /// epoch registers as needed.  Refused while a fork is pending, the old
    /// branch must not grow past its fork point.
    pub fn commit_block(
        &mut self,
        height: Height,
        updates: &UpdateBatch,
    ) -> Result<(), Error> {
        if !matches!(self.stage, ForkStage::Active) {
            return Err(Error::BranchSuspended(height));
        }

        process_block(&mut self.branch, height, updates, &self.params.rollup)?;
        Ok(())
    }

    /// Submits a block proof to L1 and, on success, acknowledges it.  A
    /// verifier rejection is not retried; it flips the branch into
    /// `ForkPending` and comes back as an error.
    pub fn submit_block_proof(&mut self, proof: &BlockProof) -> Result<(), Error> {
        match self.bridge.submit_proof(proof) {
            Ok(()) => {
                self.bridge.acknowledge(proof.height())?;
                Ok(())
            }
            Err(err @ BridgeError::ProofRejected { height, .. }) => {
                self.observe_trigger(ForkTrigger::ProofRejected { height });
                Err(err.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Checks the bridge for updates past their deadline.  Returns the
    /// trigger if the branch is (now) fork-pending.
    pub fn check_deadlines(&mut self, now: Timestamp) -> Option<ForkTrigger> {
        if let ForkStage::ForkPending(trigger) = &self.stage {
            return Some(trigger.clone());
        }

        let stale = self.bridge.stale_updates(now);
        let latest = stale
            .iter()
            .max_by_key(|u| self.bridge.deadline_for(u))?
            .clone();

        let trigger = ForkTrigger::DeadlineExpired { update: latest };
        self.observe_trigger(trigger.clone());
        Some(trigger)
    }

    /// Records an enforcement failure.  The first trigger wins; later ones
    /// are logged and dropped since the branch is already condemned.
    pub fn observe_trigger(&mut self, trigger: ForkTrigger) {
        match &self.stage {
            ForkStage::Active => {
                warn!(?trigger, fork_id = %self.branch.fork_id(), "enforcement failure, fork pending");
                self.stage = ForkStage::ForkPending(trigger);
            }
            ForkStage::ForkPending(first) => {
                debug!(?trigger, ?first, "additional trigger while fork already pending");
            }
        }
    }

    /// Executes the reset onto a new branch.
    ///
    /// `residue` is the batch of updates that were committed to pre-fork L2
    /// blocks but never acknowledged on L1; how these reconcile into the
    /// new genesis is a policy decision made by the caller's
    /// [`ReconcilePolicy`], and the strict default refuses a non-empty
    /// residue rather than guess.
    pub fn execute_reset(
        &mut self,
        now: Timestamp,
        residue: &UpdateBatch,
    ) -> Result<BranchStatus, Error> {
        if !matches!(self.stage, ForkStage::ForkPending(_)) {
            return Err(Error::NoForkPending);
        }

        // The stale registrations are folded into the new genesis.  On a
        // proof rejection there may be nothing stale yet, in which case
        // every uncompleted update is on the table.
        let stale = self.bridge.stale_updates(now);
        let stale = if stale.is_empty() {
            self.bridge.outstanding_updates()
        } else {
            stale
        };

        if stale.is_empty() {
            return Err(Error::NothingStale);
        }

        // The update with the latest deadline carries the most recent L1
        // epoch, which becomes the branch identity.
        let fork_epoch = stale.max_l1_epoch().expect("forkman: empty stale batch");
        let fork_id = ForkId::from_l1_epoch(fork_epoch);
        if fork_id <= self.branch.fork_id() {
            return Err(Error::NonMonotonicForkId {
                cur: self.branch.fork_id(),
                new: fork_id,
            });
        }

        // New genesis: the set L1 last accepted, reconciled per policy,
        // with the stale registrations replayed on top in original order.
        let accepted = self.bridge.accepted_valset();
        let base = self.policy.reconcile(&accepted, residue)?;
        let genesis_set = apply_updates(&base, &stale);

        // The new branch starts as the child of the last block L1 accepted.
        // If nothing was ever accepted the branch restarts from its own
        // origin.
        let origin = self
            .bridge
            .last_accepted_height()
            .map(|h| h + 1)
            .unwrap_or_else(|| self.branch.ledger().origin_height());

        warn!(%fork_id, %origin, "resetting onto new branch");

        let genesis = BranchGenesis::new(origin, genesis_set);
        self.branch = BranchState::from_genesis(fork_id, genesis, self.params.rollup.epoch_len);
        self.stage = ForkStage::Active;

        Ok(self.status())
    }
}

#[cfg(test)]
mod tests {
    use azurite_l1_bridge::relay::RelayBridge;
    use azurite_primitives::buf::Buf32;
    use azurite_primitives::params::{L1Params, RollupParams};
    use azurite_state::update::{UpdateKind, UpdateOrigin};
    use azurite_state::valset::{ValidatorEntry, ValidatorId, ValidatorSet};

    use crate::reconcile::StrictReconcile;

    use super::*;

    fn make_params() -> Arc<Params> {
        Arc::new(Params {
            rollup: RollupParams { epoch_len: 3 },
            l1: L1Params {
                epoch_zero_timestamp: 0,
                epoch_duration: 1_000,
                ack_delay_epochs: 2,
            },
        })
    }

    fn vid(b: u8) -> ValidatorId {
        Buf32::from([b; 32])
    }

    fn genesis_valset() -> ValidatorSet {
        ValidatorSet::from_entries([ValidatorEntry::new(vid(1), 10)])
    }

    fn register_update(b: u8, power: u64, l1_epoch: u64) -> ValidatorSetUpdate {
        ValidatorSetUpdate::new(
            vid(b),
            UpdateKind::Register(power),
            UpdateOrigin::new(Buf32::from([0xee; 32]), l1_epoch),
        )
    }

    fn make_fm() -> ForkManager<RelayBridge, StrictReconcile> {
        let params = make_params();
        let bridge = RelayBridge::new(params.clone(), genesis_valset());
        ForkManager::new(
            params,
            bridge,
            StrictReconcile,
            BranchGenesis::new(0, genesis_valset()),
        )
    }

    #[test]
    fn test_deadline_expiry_forces_fork() {
        let mut fm = make_fm();

        // Update committed in L1 epoch 1, due at the start of epoch 3.
        let u = register_update(2, 20, 1);
        fm.bridge_mut().push_update(u.clone());
        assert_eq!(fm.bridge().deadline_for(&u), 3_000);

        // Nothing stale before the deadline.
        assert_eq!(fm.check_deadlines(2_999), None);
        assert!(matches!(fm.stage(), ForkStage::Active));

        // Past the deadline with no ack covering it: fork pending.
        let trigger = fm.check_deadlines(3_001).expect("test: trigger");
        assert_eq!(trigger, ForkTrigger::DeadlineExpired { update: u.clone() });

        // The condemned branch refuses new blocks.
        let res = fm.commit_block(1, &UpdateBatch::new_empty());
        assert!(matches!(res, Err(Error::BranchSuspended(1))));

        // Reset: genesis is the accepted set with the stale update replayed
        // on top, identity comes from the update's L1 epoch.
        let status = fm
            .execute_reset(3_001, &UpdateBatch::new_empty())
            .expect("test: reset");
        assert_eq!(status.fork_id, ForkId::from_l1_epoch(1));
        assert_eq!(fm.current_fork_id(), ForkId::from_l1_epoch(1));
        assert!(matches!(fm.stage(), ForkStage::Active));

        let genesis = fm.branch().ledger().genesis();
        assert_eq!(genesis.power_of(&vid(1)), 10);
        assert_eq!(genesis.power_of(&vid(2)), 20);
        assert_eq!(fm.branch().active_set(), genesis);

        // Nothing was ever accepted, so the branch restarts from its own
        // origin.
        assert_eq!(status.origin_height, 0);
    }

    #[test]
    fn test_ack_before_deadline_cancels_expiry() {
        let mut fm = make_fm();
        let u = register_update(2, 20, 1);
        fm.bridge_mut().push_update(u.clone());

        // Prove and acknowledge a block carrying the update before its
        // deadline.
        let proof = BlockProof::new(2, vid(1), 1, vec![vid(1)], UpdateBatch::new(vec![u]));
        fm.submit_block_proof(&proof).expect("test: submit");

        assert_eq!(fm.check_deadlines(u64::MAX), None);
        assert!(matches!(fm.stage(), ForkStage::Active));
        assert_eq!(fm.bridge().last_accepted_height(), Some(2));
    }

    #[test]
    fn test_proof_rejection_forces_fork() {
        let mut fm = make_fm();

        // An uncompleted update gives the eventual fork its identity.
        fm.bridge_mut().push_update(register_update(3, 30, 2));

        // Proof produced by a validator outside the expected set.
        let proof = BlockProof::new(2, vid(9), 1, vec![vid(1)], UpdateBatch::new_empty());
        let res = fm.submit_block_proof(&proof);
        assert!(matches!(res, Err(Error::Bridge(_))));
        assert!(matches!(
            fm.stage(),
            ForkStage::ForkPending(ForkTrigger::ProofRejected { height: 2 })
        ));

        // Reset derives the fork id from the outstanding update even though
        // its deadline hasn't passed yet.
        let status = fm
            .execute_reset(0, &UpdateBatch::new_empty())
            .expect("test: reset");
        assert_eq!(status.fork_id, ForkId::from_l1_epoch(2));
        assert_eq!(fm.branch().ledger().genesis().power_of(&vid(3)), 30);
    }

    #[test]
    fn test_fork_origin_is_child_of_last_accepted() {
        let mut fm = make_fm();

        // Accept a few blocks, then let a later update go stale.
        for h in 1..=4 {
            let proof = BlockProof::new(h, vid(1), h - 1, vec![vid(1)], UpdateBatch::new_empty());
            fm.submit_block_proof(&proof).expect("test: submit");
        }

        fm.bridge_mut().push_update(register_update(2, 20, 1));
        fm.check_deadlines(10_000).expect("test: trigger");

        let status = fm
            .execute_reset(10_000, &UpdateBatch::new_empty())
            .expect("test: reset");
        assert_eq!(status.origin_height, 5);
        assert_eq!(fm.branch().ledger().origin_height(), 5);
    }

    #[test]
    fn test_reset_without_trigger_rejected() {
        let mut fm = make_fm();
        let res = fm.execute_reset(0, &UpdateBatch::new_empty());
        assert!(matches!(res, Err(Error::NoForkPending)));
    }

    #[test]
    fn test_strict_policy_rejects_residue() {
        let mut fm = make_fm();
        fm.bridge_mut().push_update(register_update(2, 20, 1));
        fm.check_deadlines(5_000).expect("test: trigger");

        let residue = UpdateBatch::new(vec![register_update(4, 40, 1)]);
        let res = fm.execute_reset(5_000, &residue);
        assert!(matches!(res, Err(Error::Reconcile(_))));

        // The branch stays suspended, the ambiguity has to be resolved by
        // the operator.
        assert!(matches!(fm.stage(), ForkStage::ForkPending(_)));
    }

    #[test]
    fn test_fork_id_must_advance() {
        let mut fm = make_fm();

        // First fork from an epoch-2 update.
        fm.bridge_mut().push_update(register_update(2, 20, 2));
        fm.check_deadlines(10_000).expect("test: trigger");
        fm.execute_reset(10_000, &UpdateBatch::new_empty())
            .expect("test: reset");
        assert_eq!(fm.current_fork_id(), ForkId::from_l1_epoch(2));

        // A later trigger whose stale updates only reach epoch 2 again
        // cannot mint a fresh identity.
        fm.bridge_mut().push_update(register_update(5, 50, 2));
        fm.check_deadlines(20_000).expect("test: trigger");
        let res = fm.execute_reset(20_000, &UpdateBatch::new_empty());
        assert!(matches!(res, Err(Error::NonMonotonicForkId { .. })));
    }
}
