// Reexports from elsewhere in the crate.

pub use crate::branch::{BranchGenesis, BranchState, ForkId};
pub use crate::ledger::{LedgerError, StateLedger};
pub use crate::register::EpochRegister;
pub use crate::status::BranchStatus;
pub use crate::update::{UpdateBatch, UpdateKind, UpdateOrigin, ValidatorSetUpdate};
pub use crate::valset::{ValidatorEntry, ValidatorId, ValidatorSet, VotingPower};
