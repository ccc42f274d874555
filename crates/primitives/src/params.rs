//! Global consensus parameters for the rotation protocol.

use thiserror::Error;

use crate::{Epoch, Timestamp};

/// Rollup-side parameters that don't change for the lifetime of a branch.
/// Changing the epoch length mid-chain is treated as a new network, not
/// handled here.
#[derive(Clone, Debug)]
pub struct RollupParams {
    /// Number of L2 blocks per epoch.
    pub epoch_len: u64,
}

/// Parameters describing the L1 chain's epoch schedule, which drives the
/// acknowledgement deadlines enforced by the L1 verifier contract.
#[derive(Clone, Debug)]
pub struct L1Params {
    /// Timestamp of the start of L1 epoch 0.
    pub epoch_zero_timestamp: Timestamp,

    /// Duration of an L1 epoch in milliseconds.
    pub epoch_duration: u64,

    /// Number of L1 epochs the L2 chain has to acknowledge an update before
    /// it goes stale.
    pub ack_delay_epochs: u64,
}

impl L1Params {
    /// Returns the timestamp at which an L1 epoch starts.
    pub fn epoch_start(&self, epoch: Epoch) -> Timestamp {
        self.epoch_zero_timestamp + epoch * self.epoch_duration
    }

    /// Returns the L1 epoch in progress at a timestamp.  Timestamps before
    /// the epoch 0 start clamp to epoch 0.
    pub fn epoch_at(&self, ts: Timestamp) -> Epoch {
        ts.saturating_sub(self.epoch_zero_timestamp) / self.epoch_duration
    }
}

/// Combined set of parameters across all the consensus logic.
#[derive(Clone, Debug)]
pub struct Params {
    pub rollup: RollupParams,
    pub l1: L1Params,
}

impl Params {
    pub fn rollup(&self) -> &RollupParams {
        &self.rollup
    }

    pub fn l1(&self) -> &L1Params {
        &self.l1
    }

    /// Checks the parameters for basic sensibility.  Meant to be called once
    /// at startup before anything consumes them.
    pub fn check_sanity(&self) -> Result<(), ParamsError> {
        if self.rollup.epoch_len == 0 {
            return Err(ParamsError::ZeroEpochLen);
        }

        if self.l1.epoch_duration == 0 {
            return Err(ParamsError::ZeroL1EpochDuration);
        }

        if self.l1.ack_delay_epochs == 0 {
            return Err(ParamsError::ZeroAckDelay);
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("rollup epoch length must be positive")]
    ZeroEpochLen,

    #[error("L1 epoch duration must be positive")]
    ZeroL1EpochDuration,

    #[error("L1 ack delay must be at least one epoch")]
    ZeroAckDelay,
}
