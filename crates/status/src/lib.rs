//! Publishes the current branch position to the rest of the node.
//!
//! The rotation worker is the single writer; everything else holds a cheap
//! clone of the channel and reads a consistent [`BranchStatus`] snapshot.
//! Because a whole snapshot is swapped at once, readers never observe a
//! half-reset branch.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use azurite_state::branch::ForkId;
use azurite_state::status::BranchStatus;

/// A wrapper around the status sender and receiver ends, cloned freely
/// across the node.
#[derive(Clone)]
pub struct StatusChannel {
    sender: Arc<watch::Sender<BranchStatus>>,
    receiver: watch::Receiver<BranchStatus>,
}

impl StatusChannel {
    /// Creates the channel with the branch's initial position.
    pub fn new(initial: BranchStatus) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            sender: Arc::new(tx),
            receiver: rx,
        }
    }

    /// Replaces the published snapshot.  Called only from the rotation
    /// worker's single-writer path.
    pub fn publish(&self, status: BranchStatus) {
        trace!(fork_id = %status.fork_id, last_height = %status.last_height, "publishing status");
        self.sender.send_replace(status);
    }

    /// Snapshot of the current branch position.
    pub fn get(&self) -> BranchStatus {
        self.receiver.borrow().clone()
    }

    /// Identity of the branch all current consensus messages must carry.
    pub fn current_fork_id(&self) -> ForkId {
        self.receiver.borrow().fork_id
    }

    /// A receiver for callers that want to await changes themselves.
    pub fn subscribe(&self) -> watch::Receiver<BranchStatus> {
        self.receiver.clone()
    }

    /// Waits until a status for a branch other than `known` is published and
    /// returns it.  Used by components that must drop in-flight work when
    /// the chain identity changes.
    pub async fn wait_for_fork(&self, known: ForkId) -> BranchStatus {
        let mut rx = self.receiver.clone();
        let status = rx
            .wait_for(|s| s.fork_id != known)
            .await
            .expect("status: channel closed");
        status.clone()
    }
}
