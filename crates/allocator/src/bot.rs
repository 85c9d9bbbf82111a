use crate::error::AllocatorError;
use crate::planner::compute_plan;
use configuration::AllocatorSettings;
use core_types::{Address, MAX_BPS, StrategySnapshot};
use token::TokenLedger;
use vault::{RebalancePlan, Vault};

/// The off-chain keeper that keeps the vault's allocations on target.
///
/// The bot only plans. Execution goes through `Vault::rebalance` with the bot's
/// own address as the caller, so the vault's role checks still apply.
#[derive(Debug, Clone)]
pub struct AllocationBot {
    address: Address,
    params: AllocatorSettings,
}

impl AllocationBot {
    /// Creates a new `AllocationBot`, validating the configured parameters.
    pub fn new(address: Address, params: AllocatorSettings) -> Result<Self, AllocatorError> {
        if address.is_zero() {
            return Err(AllocatorError::InvalidParameters(
                "the allocation bot needs a non-zero address".to_string(),
            ));
        }
        if params.idle_reserve_bps > MAX_BPS {
            return Err(AllocatorError::InvalidParameters(format!(
                "idle_reserve_bps must be at most {}",
                MAX_BPS
            )));
        }
        Ok(Self { address, params })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn params(&self) -> &AllocatorSettings {
        &self.params
    }

    /// Plans a rebalance from the vault's current live balances.
    pub fn plan(&self, vault: &Vault, assets: &TokenLedger) -> Result<RebalancePlan, AllocatorError> {
        let views = vault.strategy_views(assets)?;
        compute_plan(
            &views,
            vault.idle_balance(assets),
            self.params.idle_reserve_bps,
            u128::from(self.params.min_move),
        )
    }

    /// Plans and, unless there is nothing to do, executes a rebalance.
    ///
    /// Returns `None` when no rebalance was submitted: the vault is paused, is in
    /// single-strategy mode, or is already on target.
    pub fn run(
        &self,
        vault: &mut Vault,
        assets: &mut TokenLedger,
    ) -> Result<Option<Vec<StrategySnapshot>>, AllocatorError> {
        if vault.is_paused() || !vault.multi_strategy_enabled() {
            tracing::info!(
                paused = vault.is_paused(),
                multi_strategy = vault.multi_strategy_enabled(),
                "Vault is not accepting rebalances; skipping."
            );
            return Ok(None);
        }

        let plan = self.plan(vault, assets)?;
        if plan.is_noop() {
            tracing::debug!("Allocations are on target; nothing to rebalance.");
            return Ok(None);
        }

        tracing::info!(
            withdrawals = %plan.total_withdrawals(),
            deposits = %plan.total_deposits(),
            "Submitting rebalance plan."
        );
        let snapshot = vault.rebalance(assets, self.address, &plan)?;
        Ok(Some(snapshot))
    }
}
