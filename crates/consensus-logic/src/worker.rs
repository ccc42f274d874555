//! Rotation worker task.
//!
//! Single writer for the branch: committed blocks and proof submissions
//! arrive as messages, deadline checks fire on an interval, and every state
//! change is published through the status channel.  Wall-clock time enters
//! only through the injected [`Clock`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::*;

use azurite_l1_bridge::clock::Clock;
use azurite_l1_bridge::errors::BridgeError;
use azurite_l1_bridge::traits::L1Bridge;
use azurite_state::update::UpdateBatch;
use azurite_status::StatusChannel;

use crate::errors::Error;
use crate::fork_manager::ForkManager;
use crate::message::WorkerMessage;
use crate::reconcile::ReconcilePolicy;

/// Runs the worker until the message channel closes or an unrecoverable
/// error surfaces.
pub async fn rotation_worker_task<B, P, C>(
    mut fm: ForkManager<B, P>,
    clock: C,
    status: StatusChannel,
    mut msg_rx: mpsc::Receiver<WorkerMessage>,
    poll_interval: Duration,
) -> anyhow::Result<()>
where
    B: L1Bridge + Send,
    P: ReconcilePolicy + Send,
    C: Clock + Send,
{
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    info!(fork_id = %fm.current_fork_id(), "rotation worker starting");
    status.publish(fm.status());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = clock.now();
                if fm.check_deadlines(now).is_some() {
                    try_reset(&mut fm, now, &status)?;
                }
            }

            msg = msg_rx.recv() => {
                match msg {
                    Some(m) => handle_message(&mut fm, &clock, &status, m)?,
                    None => break,
                }
            }
        }
    }

    info!("rotation worker exiting");
    Ok(())
}

fn handle_message<B, P, C>(
    fm: &mut ForkManager<B, P>,
    clock: &C,
    status: &StatusChannel,
    msg: WorkerMessage,
) -> anyhow::Result<()>
where
    B: L1Bridge,
    P: ReconcilePolicy,
    C: Clock,
{
    match msg {
        WorkerMessage::CommitBlock { height, updates } => {
            match fm.commit_block(height, &updates) {
                Ok(()) => status.publish(fm.status()),

                // Blocks for a condemned branch just get dropped, the reset
                // supersedes them.
                Err(Error::BranchSuspended(h)) => {
                    warn!(height = %h, "dropping block for suspended branch");
                }

                // Anything else is a sequencing bug upstream, retrying
                // can't help.
                Err(e) => return Err(e.into()),
            }
        }

        WorkerMessage::SubmitProof(proof) => {
            let height = proof.height();
            match fm.submit_block_proof(&proof) {
                Ok(()) => debug!(%height, "proof accepted and acknowledged"),

                Err(Error::Bridge(BridgeError::ProofRejected { .. })) => {
                    // The trigger is recorded, run the reset right away.
                    try_reset(fm, clock.now(), status)?;
                }

                Err(e) => warn!(%height, err = %e, "proof submission failed"),
            }
        }
    }

    Ok(())
}

/// Executes a pending reset and publishes the new branch.  The worker has
/// no source for pre-fork committed residue, so it passes none; with the
/// strict policy that makes any actually-ambiguous reset fail loudly here.
fn try_reset<B, P>(
    fm: &mut ForkManager<B, P>,
    now: u64,
    status: &StatusChannel,
) -> anyhow::Result<()>
where
    B: L1Bridge,
    P: ReconcilePolicy,
{
    let new_status = fm.execute_reset(now, &UpdateBatch::new_empty())?;
    status.publish(new_status);
    Ok(())
}
