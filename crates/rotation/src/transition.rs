//! Per-height and per-epoch transition functions.

use tracing::*;

use azurite_primitives::{epoch, params::RollupParams, Epoch, Height};
use azurite_state::branch::BranchState;
use azurite_state::ledger::StateLedger;
use azurite_state::update::{UpdateBatch, UpdateKind};
use azurite_state::valset::ValidatorSet;

use crate::errors::TsnError;

/// Folds an ordered update batch over a previous set, producing the next
/// one.  Each update overwrites the power of exactly one identity, so the
/// fold is deterministic and an empty batch is the identity.
///
/// Order matters: `[register A, deregister A]` ends with A absent while
/// `[deregister A, register A]` ends with A present.
pub fn apply_updates(prev: &ValidatorSet, batch: &UpdateBatch) -> ValidatorSet {
    let mut next = prev.clone();

    for u in batch.iter() {
        match u.kind() {
            UpdateKind::Register(power) => next.set_power(*u.id(), *power),
            UpdateKind::Deregister => next.remove(u.id()),
            UpdateKind::SetPower(power) => next.set_power(*u.id(), *power),
        }
    }

    next
}

/// Executes the epoch-boundary register transition into `next_epoch`.  The
/// staged set is read from the ledger at the last height of the epoch before
/// the one we're entering, which is how activation ends up delayed by two
/// epochs.
///
/// # Panics
///
/// Via [`azurite_state::register::EpochRegister::rollover`] if `next_epoch`
/// doesn't directly succeed the registers' current epoch.  Boundary
/// bookkeeping is the caller's job, getting it wrong is not recoverable.
pub fn process_epoch_rollover(branch: &mut BranchState, next_epoch: Epoch, params: &RollupParams) {
    let staged = branch
        .ledger()
        .last_of_epoch(next_epoch - 1, params.epoch_len)
        .clone();

    debug!(%next_epoch, "rolling epoch registers");
    branch.register_mut().rollover(next_epoch, staged);
}

/// Plays out one committed block on the branch: rolls the registers if the
/// height opens a new epoch, then folds the block's update batch into the
/// ledger.  The branch genesis height itself is seeded at branch creation
/// and never passes through here.
pub fn process_block(
    branch: &mut BranchState,
    height: Height,
    updates: &UpdateBatch,
    params: &RollupParams,
) -> Result<(), TsnError> {
    let block_epoch = epoch::epoch_of(height, params.epoch_len);

    if epoch::is_epoch_boundary(height, params.epoch_len) {
        // Entering a new epoch.  The register must be exactly one behind,
        // otherwise the caller fed us heights out of order.
        if block_epoch != branch.cur_epoch() + 1 {
            return Err(TsnError::MismatchEpoch(block_epoch, branch.cur_epoch()));
        }
        process_epoch_rollover(branch, block_epoch, params);
    } else if block_epoch != branch.cur_epoch() {
        return Err(TsnError::MismatchEpoch(block_epoch, branch.cur_epoch()));
    }

    let next = apply_updates(branch.ledger().head(), updates);
    branch.ledger_mut().append(height, next)?;

    if !updates.is_empty() {
        trace!(%height, count = updates.len(), "applied validator set updates");
    }

    Ok(())
}

/// Recomputes the active set for an epoch directly from the ledger:
/// `V(e) = S(max(last_of(e - 2), H0))`, with the branch genesis standing in
/// whenever the look-back epoch predates the branch (or doesn't exist).
///
/// This is the non-incremental equivalent of the register path and exists
/// for validation and recompute-from-scratch.
pub fn active_set_at_epoch(ledger: &StateLedger, e: Epoch, epoch_len: u64) -> &ValidatorSet {
    match e.checked_sub(2) {
        Some(source) => ledger.last_of_epoch(source, epoch_len),
        None => ledger.genesis(),
    }
}

/// Checks that the incremental registers agree with the direct formula for
/// the branch's current epoch.  Divergence means replay would not reproduce
/// this state, which breaks cross-validator agreement.
pub fn check_register_consistency(
    branch: &BranchState,
    params: &RollupParams,
) -> Result<(), TsnError> {
    let e = branch.cur_epoch();
    let ledger = branch.ledger();

    if branch.register().active() != active_set_at_epoch(ledger, e, params.epoch_len) {
        return Err(TsnError::InconsistentRegister(e));
    }

    if branch.register().staged() != active_set_at_epoch(ledger, e + 1, params.epoch_len) {
        return Err(TsnError::InconsistentRegister(e + 1));
    }

    Ok(())
}
