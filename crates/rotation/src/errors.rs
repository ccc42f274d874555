use thiserror::Error;

use azurite_primitives::Epoch;
use azurite_state::ledger::LedgerError;

/// Error with a block state transition.
#[derive(Debug, Error)]
pub enum TsnError {
    /// The block's height implies an epoch the registers don't agree with.
    #[error("block implies epoch {0} but registers describe {1}")]
    MismatchEpoch(Epoch, Epoch),

    /// The recomputed register values disagree with the incremental ones,
    /// which means state evolution diverged somewhere upstream.
    #[error("register for epoch {0} inconsistent with recorded ledger")]
    InconsistentRegister(Epoch),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
}
