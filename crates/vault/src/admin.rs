use crate::allocation::StrategyAllocation;
use crate::error::VaultError;
use crate::movement::drain;
use crate::reconcile::reconcile_entry;
use crate::vault::Vault;
use core_types::{Address, MAX_BPS};
use events::VaultEvent;
use performance::PerformanceLedger;
use std::sync::Arc;
use strategies::Strategy;
use token::TokenLedger;

fn ensure_weight(weight_bps: u16) -> Result<(), VaultError> {
    if weight_bps > MAX_BPS {
        return Err(VaultError::InvalidWeight(weight_bps));
    }
    Ok(())
}

impl Vault {
    /// Registers a strategy with a target weight. The strategy is bound to this
    /// vault if it is not bound yet, and starts with a tracked balance of zero.
    pub fn add_strategy(
        &mut self,
        caller: Address,
        mut strategy: Box<dyn Strategy>,
        target_weight_bps: u16,
    ) -> Result<(), VaultError> {
        self.roles.require_strategy_manager(caller)?;
        ensure_weight(target_weight_bps)?;
        let address = strategy.address();
        if self.allocations.contains(&address) {
            return Err(VaultError::DuplicateStrategy(address));
        }
        self.adopt_strategy(&mut *strategy)?;

        self.allocations.push(StrategyAllocation::new(strategy, target_weight_bps))?;
        tracing::info!(strategy = %address, target_weight_bps, "Strategy added.");
        self.emit(VaultEvent::StrategyAdded { strategy: address, target_weight_bps });
        Ok(())
    }

    /// Unregisters a drained strategy and hands it back.
    pub fn remove_strategy(&mut self, caller: Address, strategy: Address) -> Result<Box<dyn Strategy>, VaultError> {
        self.roles.require_strategy_manager(caller)?;
        let entry = self.allocations.get(&strategy).ok_or(VaultError::StrategyNotFound(strategy))?;
        if entry.tracked_balance != 0 {
            return Err(VaultError::StrategyNotDrained { strategy, balance: entry.tracked_balance });
        }

        let removed = self.allocations.swap_remove(&strategy)?;
        tracing::info!(%strategy, "Strategy removed.");
        self.emit(VaultEvent::StrategyRemoved { strategy });
        Ok(removed.strategy)
    }

    pub fn update_strategy_weight(
        &mut self,
        caller: Address,
        strategy: Address,
        target_weight_bps: u16,
    ) -> Result<(), VaultError> {
        self.roles.require_strategy_manager(caller)?;
        ensure_weight(target_weight_bps)?;
        let entry = self.allocations.get_mut(&strategy).ok_or(VaultError::StrategyNotFound(strategy))?;
        let old_weight_bps = entry.target_weight_bps;
        entry.target_weight_bps = target_weight_bps;

        tracing::info!(%strategy, old_weight_bps, target_weight_bps, "Strategy weight updated.");
        self.emit(VaultEvent::StrategyWeightUpdated { strategy, old_weight_bps, new_weight_bps: target_weight_bps });
        Ok(())
    }

    pub fn set_multi_strategy_enabled(&mut self, caller: Address, enabled: bool) -> Result<(), VaultError> {
        self.roles.require_owner(caller)?;
        self.multi_strategy_enabled = enabled;
        tracing::info!(enabled, "Multi-strategy mode toggled.");
        self.emit(VaultEvent::MultiStrategyToggled { enabled });
        Ok(())
    }

    pub fn set_allocation_bot(&mut self, caller: Address, bot: Address) -> Result<(), VaultError> {
        self.roles.require_owner(caller)?;
        if bot.is_zero() {
            return Err(VaultError::ZeroAddress("allocation bot"));
        }
        let old = self.roles.allocation_bot.replace(bot);
        tracing::info!(%bot, "Allocation bot updated.");
        self.emit(VaultEvent::AllocationBotUpdated { old, new: bot });
        Ok(())
    }

    pub fn set_strategy_manager(&mut self, caller: Address, manager: Address) -> Result<(), VaultError> {
        self.roles.require_owner(caller)?;
        if manager.is_zero() {
            return Err(VaultError::ZeroAddress("strategy manager"));
        }
        let old = self.roles.strategy_manager.replace(manager);
        tracing::info!(%manager, "Strategy manager updated.");
        self.emit(VaultEvent::StrategyManagerUpdated { old, new: manager });
        Ok(())
    }

    /// Installs the strategy used while multi-strategy mode is off. The strategy it
    /// replaces must be empty and is handed back.
    pub fn set_strategy(
        &mut self,
        caller: Address,
        assets: &TokenLedger,
        mut strategy: Box<dyn Strategy>,
    ) -> Result<Option<Box<dyn Strategy>>, VaultError> {
        self.roles.require_owner(caller)?;
        self.ensure_asset_ledger(assets)?;
        if let Some(current) = &self.legacy {
            let balance = current.strategy.total_assets(assets)?;
            if balance != 0 {
                return Err(VaultError::StrategyNotDrained { strategy: current.address(), balance });
            }
        }
        self.adopt_strategy(&mut *strategy)?;

        let new = strategy.address();
        let old = self.legacy.replace(StrategyAllocation::new(strategy, MAX_BPS));
        let old_address = old.as_ref().map(StrategyAllocation::address);
        tracing::info!(strategy = %new, "Legacy strategy updated.");
        self.emit(VaultEvent::LegacyStrategyUpdated { old: old_address, new });
        Ok(old.map(|entry| entry.strategy))
    }

    /// Sets or clears the sink strategy capital flows are reported to.
    pub fn set_performance_ledger(
        &mut self,
        caller: Address,
        ledger: Option<Arc<dyn PerformanceLedger>>,
    ) -> Result<(), VaultError> {
        self.roles.require_owner(caller)?;
        tracing::info!(enabled = ledger.is_some(), "Performance ledger updated.");
        self.performance_ledger = ledger;
        Ok(())
    }

    /// Stops deposits and rebalances and cuts strategies out of the accounting.
    pub fn pause(&mut self, caller: Address) -> Result<(), VaultError> {
        self.roles.require_owner(caller)?;
        if self.paused {
            return Err(VaultError::Paused);
        }
        self.paused = true;
        tracing::info!(%caller, "Vault paused.");
        self.emit(VaultEvent::Paused { caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), VaultError> {
        self.roles.require_owner(caller)?;
        if !self.paused {
            return Err(VaultError::NotPaused);
        }
        self.paused = false;
        tracing::info!(%caller, "Vault unpaused.");
        self.emit(VaultEvent::Unpaused { caller });
        Ok(())
    }

    /// Pulls everything out of every strategy (and the legacy strategy) into the
    /// idle balance. Only while paused. Returns the total recovered.
    pub fn emergency_withdraw(&mut self, caller: Address, assets: &mut TokenLedger) -> Result<u128, VaultError> {
        self.roles.require_owner(caller)?;
        self.ensure_asset_ledger(assets)?;
        if !self.paused {
            return Err(VaultError::NotPaused);
        }

        let recovered = self.atomically(assets, |vault, assets| vault.drain_everything(assets))?;
        tracing::warn!(%caller, recovered, "Emergency withdrawal executed.");
        self.emit(VaultEvent::EmergencyWithdrawn { caller, recovered });
        Ok(recovered)
    }

    fn drain_everything(&mut self, assets: &mut TokenLedger) -> Result<u128, VaultError> {
        let vault = self.address;
        let mut recovered = 0u128;
        for i in 0..self.allocations.len() {
            let entry = &mut self.allocations.entries_mut()[i];
            let live = entry.strategy.total_assets(assets)?;
            let reconciliation = reconcile_entry(entry, live);
            let strategy = entry.address();
            let received = drain(entry, assets, vault)?;
            self.record_reconciliation(&reconciliation);
            self.record_strategy_withdrawal(strategy, live, received);
            recovered = recovered.saturating_add(received);
        }
        if let Some(entry) = self.legacy.as_mut() {
            let live = entry.strategy.total_assets(assets)?;
            let reconciliation = reconcile_entry(entry, live);
            let strategy = entry.address();
            let received = drain(entry, assets, vault)?;
            self.record_reconciliation(&reconciliation);
            self.record_strategy_withdrawal(strategy, live, received);
            recovered = recovered.saturating_add(received);
        }

        Ok(recovered)
    }
}
