//! Branch bootstrap.

use tracing::*;

use azurite_primitives::params::Params;
use azurite_state::branch::BranchGenesis;

/// Validates the externally supplied genesis input before anything consumes
/// it.  This is the one place outside state enters the system, so we're
/// strict about it here rather than sprinkling checks downstream.
pub fn check_genesis_input(params: &Params, genesis: &BranchGenesis) -> anyhow::Result<()> {
    params.check_sanity()?;

    genesis.valset().sanity_check();
    if genesis.valset().is_empty() {
        anyhow::bail!("genesis validator set is empty");
    }

    info!(
        origin_height = %genesis.origin_height(),
        validators = %genesis.valset().len(),
        "genesis input accepted"
    );

    Ok(())
}
