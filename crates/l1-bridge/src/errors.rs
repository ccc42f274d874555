use thiserror::Error;

use azurite_primitives::{Epoch, Height};

/// Why the L1 verifier refused a proof.  Rejections are terminal for the
/// submitted proof, resubmitting the same bytes fails the same way.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RejectReason {
    #[error("producer not in the expected validator set for epoch {0}")]
    ProducerNotInSet(Epoch),

    #[error("parent block at height {0} not signed by its expected set")]
    ParentNotJustified(Height),
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum BridgeError {
    /// The verifier refused the proof.  Surfaced to the fork manager as an
    /// enforcement-failure signal, not retried.
    #[error("proof for height {height} rejected: {reason}")]
    ProofRejected { height: Height, reason: RejectReason },

    /// Acknowledging a height we never saw a successful proof for.
    #[error("no accepted proof recorded for height {0}")]
    UnknownHeight(Height),

    /// Acknowledging the same height twice.
    #[error("height {0} already acknowledged")]
    AlreadyAcknowledged(Height),

    /// Proofs must be submitted for increasing heights.
    #[error("proof height {got} does not extend accepted height {accepted}")]
    StaleProofHeight { accepted: Height, got: Height },
}
