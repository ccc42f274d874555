//! Validator-set rotation state transition.
//!
//! Pure, deterministic functions that advance a branch's state: folding
//! update batches into the ledger at each height and rolling the epoch
//! registers at each boundary.  Nothing here talks to the outside world,
//! callers feed in committed blocks and the L1 collaborator's data.

pub mod errors;
pub mod transition;
