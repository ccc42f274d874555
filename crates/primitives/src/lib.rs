//! Common primitive types shared across the rotation protocol crates.
//!
//! These types are kept deliberately small and free of consensus semantics so
//! that every other crate can depend on them without dragging in transition
//! logic.

pub mod buf;
pub mod epoch;
pub mod params;

pub mod prelude;

/// Height of a committed block within a branch, one block per height.
pub type Height = u64;

/// Index of a fixed-length window of consecutive heights.
pub type Epoch = u64;

/// Unix millisecond timestamp, as used for L1 epoch scheduling.
pub type Timestamp = u64;
