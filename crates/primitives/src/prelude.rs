// Reexports from elsewhere in the crate.

pub use crate::buf::Buf32;
pub use crate::params::{L1Params, Params, RollupParams};
pub use crate::{Epoch, Height, Timestamp};
