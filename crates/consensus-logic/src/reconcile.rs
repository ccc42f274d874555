//! Policy seam for the unresolved part of a fork reset.
//!
//! Updates that made it into pre-fork L2 blocks without ever being
//! acknowledged on L1 have no defined place in the new branch's genesis, the
//! source protocol leaves their reconciliation open.  Rather than bake in a
//! guess, the reset takes a policy object; the default one refuses to
//! proceed whenever the question would actually arise.

use thiserror::Error;

use azurite_state::update::UpdateBatch;
use azurite_state::valset::ValidatorSet;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ReconcileError {
    /// The strict policy met updates it has no defined answer for.
    #[error("{0} pre-fork committed updates with no defined reconciliation")]
    AmbiguousResidue(usize),
}

/// Decides how updates committed to the abandoned branch, but absent from
/// the L1-accepted set, fold into the new branch genesis.
pub trait ReconcilePolicy {
    /// Produces the base set the stale registrations are applied on top of.
    /// `accepted` is the set as L1 last acknowledged it; `residue` is the
    /// pre-fork committed-but-unacknowledged updates, in commitment order.
    fn reconcile(
        &self,
        accepted: &ValidatorSet,
        residue: &UpdateBatch,
    ) -> Result<ValidatorSet, ReconcileError>;
}

/// Rejects any ambiguous reconciliation outright.  With an empty residue
/// the accepted set passes through unchanged.
#[derive(Clone, Debug, Default)]
pub struct StrictReconcile;

impl ReconcilePolicy for StrictReconcile {
    fn reconcile(
        &self,
        accepted: &ValidatorSet,
        residue: &UpdateBatch,
    ) -> Result<ValidatorSet, ReconcileError> {
        if !residue.is_empty() {
            return Err(ReconcileError::AmbiguousResidue(residue.len()));
        }

        Ok(accepted.clone())
    }
}
