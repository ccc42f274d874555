//! Interface to the L1 ledger that anchors the validator-set schedule.
//!
//! The L1 contract itself is an external collaborator, this crate only
//! defines the narrow surface the rotation core consumes: enumerating
//! outstanding updates, the acknowledgement deadline schedule, and the
//! accept/reject behavior of the proof verifier.  An in-memory
//! [`relay::RelayBridge`] implements the surface for tests and local runs.
//!
//! All wall-clock nondeterminism is confined to the [`clock`] module, the
//! trait methods themselves take explicit timestamps.

pub mod clock;
pub mod errors;
pub mod proof;
pub mod relay;
pub mod traits;
