//! Capital movement between the vault's idle balance and a single strategy.

use crate::allocation::StrategyAllocation;
use crate::error::VaultError;
use crate::vault::Vault;
use chrono::Utc;
use core_types::Address;
use events::VaultEvent;
use performance::PerformanceDelta;
use token::TokenLedger;

/// Asks the strategy to release `amount` to `vault` and returns what actually
/// arrived. The tracked balance becomes the strategy's new live balance.
pub(crate) fn pull_from(
    entry: &mut StrategyAllocation,
    assets: &mut TokenLedger,
    vault: Address,
    amount: u128,
) -> Result<u128, VaultError> {
    let before = assets.balance_of(&vault);
    entry.strategy.withdraw(assets, amount)?;
    let received = assets.balance_of(&vault).saturating_sub(before);

    entry.tracked_balance = entry.strategy.total_assets(assets)?;
    entry.last_synced_at = Some(Utc::now());
    Ok(received)
}

/// Transfers `amount` of idle funds to the strategy and has it put them to work.
pub(crate) fn push_to(
    entry: &mut StrategyAllocation,
    assets: &mut TokenLedger,
    vault: Address,
    amount: u128,
) -> Result<(), VaultError> {
    assets.transfer(&vault, &entry.address(), amount)?;
    if entry.capabilities.exact_deposit {
        entry.strategy.deposit_exact(assets, amount)?;
    } else {
        entry.strategy.deposit(assets)?;
    }
    entry.tracked_balance = entry.tracked_balance.saturating_add(amount);
    Ok(())
}

/// Releases everything the strategy holds to `vault` and zeroes the tracked balance.
pub(crate) fn drain(entry: &mut StrategyAllocation, assets: &mut TokenLedger, vault: Address) -> Result<u128, VaultError> {
    let before = assets.balance_of(&vault);
    entry.strategy.withdraw_all(assets)?;
    let received = assets.balance_of(&vault).saturating_sub(before);

    entry.tracked_balance = 0;
    entry.last_synced_at = Some(Utc::now());
    Ok(received)
}

impl Vault {
    pub(crate) fn record_strategy_withdrawal(&mut self, strategy: Address, requested: u128, received: u128) {
        tracing::debug!(%strategy, requested, received, "Withdrew from strategy.");
        self.report_performance(strategy, PerformanceDelta::withdrawn(received));
        self.emit(VaultEvent::StrategyWithdrawn { strategy, requested, received });
    }

    pub(crate) fn record_strategy_deposit(&mut self, strategy: Address, amount: u128) {
        tracing::debug!(%strategy, amount, "Deposited into strategy.");
        self.report_performance(strategy, PerformanceDelta::deposited(amount));
        self.emit(VaultEvent::StrategyDeposited { strategy, amount });
    }
}
