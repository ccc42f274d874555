//! Messages handled by the rotation worker task.

use azurite_l1_bridge::proof::BlockProof;
use azurite_primitives::Height;
use azurite_state::update::UpdateBatch;

/// Inputs the surrounding node feeds into the worker.  All branch mutation
/// funnels through these so the single-writer ordering holds.
#[derive(Clone, Debug)]
pub enum WorkerMessage {
    /// A block was committed at this height carrying these updates.
    CommitBlock { height: Height, updates: UpdateBatch },

    /// Hand this block proof to L1.
    SubmitProof(Box<BlockProof>),
}
