use crate::error::VaultError;
use crate::movement::{pull_from, push_to};
use crate::reconcile::reconcile_entry;
use crate::vault::Vault;
use core_types::{Address, StrategySnapshot};
use events::VaultEvent;
use serde::{Deserialize, Serialize};
use token::TokenLedger;

/// Per-strategy amounts to move, aligned with the allocation table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePlan {
    pub withdraw_amounts: Vec<u128>,
    pub deposit_amounts: Vec<u128>,
}

impl RebalancePlan {
    pub fn new(withdraw_amounts: Vec<u128>, deposit_amounts: Vec<u128>) -> Self {
        Self { withdraw_amounts, deposit_amounts }
    }

    /// An all-zero plan for `strategies` entries.
    pub fn noop(strategies: usize) -> Self {
        Self::new(vec![0; strategies], vec![0; strategies])
    }

    pub fn is_noop(&self) -> bool {
        self.withdraw_amounts.iter().chain(&self.deposit_amounts).all(|amount| *amount == 0)
    }

    pub fn total_withdrawals(&self) -> u128 {
        self.withdraw_amounts.iter().fold(0u128, |acc, a| acc.saturating_add(*a))
    }

    pub fn total_deposits(&self) -> u128 {
        self.deposit_amounts.iter().fold(0u128, |acc, a| acc.saturating_add(*a))
    }
}

impl Vault {
    /// Executes `plan` mechanically: sync every strategy, run all withdrawals, then
    /// all deposits. Returns the final tracked-balance snapshot.
    ///
    /// The plan is not checked against target weights. It is checked for
    /// feasibility before anything moves: no withdrawal may exceed the strategy's
    /// live balance, the deposits must fit in idle plus the withdrawals, and every
    /// strategy must accept its deposit. If a step still fails during execution,
    /// the whole rebalance is rolled back.
    pub fn rebalance(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        plan: &RebalancePlan,
    ) -> Result<Vec<StrategySnapshot>, VaultError> {
        self.ensure_asset_ledger(assets)?;
        self.roles.require_allocation_bot(caller)?;
        if self.paused {
            return Err(VaultError::Paused);
        }
        if !self.multi_strategy_enabled {
            return Err(VaultError::MultiStrategyDisabled);
        }
        let count = self.allocations.len();
        if plan.withdraw_amounts.len() != count || plan.deposit_amounts.len() != count {
            return Err(VaultError::PlanLengthMismatch {
                strategies: count,
                withdrawals: plan.withdraw_amounts.len(),
                deposits: plan.deposit_amounts.len(),
            });
        }

        let live = self.live_balances(assets)?;
        for (i, (requested, available)) in plan.withdraw_amounts.iter().zip(&live).enumerate() {
            if requested > available {
                return Err(VaultError::PlanExceedsStrategyBalance {
                    strategy: self.allocations.entries()[i].address(),
                    requested: *requested,
                    available: *available,
                });
            }
        }
        let idle = self.idle_balance(assets);
        let fundable = idle.saturating_add(plan.total_withdrawals());
        if plan.total_deposits() > fundable {
            return Err(VaultError::InsufficientIdle { required: plan.total_deposits(), available: fundable });
        }
        for (entry, amount) in self.allocations.iter().zip(&plan.deposit_amounts) {
            if *amount > 0 {
                entry.strategy.check_deposit(assets, *amount)?;
            }
        }

        self.atomically(assets, |vault, assets| vault.execute_plan(assets, caller, plan, live))
    }

    fn execute_plan(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        plan: &RebalancePlan,
        live: Vec<u128>,
    ) -> Result<Vec<StrategySnapshot>, VaultError> {
        // 1. Sync every strategy, moving or not.
        for (i, balance) in live.into_iter().enumerate() {
            let reconciliation = reconcile_entry(&mut self.allocations.entries_mut()[i], balance);
            self.record_reconciliation(&reconciliation);
        }

        // 2. All withdrawals before any deposit.
        let vault = self.address;
        for (i, amount) in plan.withdraw_amounts.iter().copied().enumerate() {
            if amount == 0 {
                continue;
            }
            let entry = &mut self.allocations.entries_mut()[i];
            let strategy = entry.address();
            let received = pull_from(entry, assets, vault, amount)?;
            self.record_strategy_withdrawal(strategy, amount, received);
        }

        // 3. Deposits out of the topped-up idle balance.
        for (i, amount) in plan.deposit_amounts.iter().copied().enumerate() {
            if amount == 0 {
                continue;
            }
            let idle = self.idle_balance(assets);
            if idle < amount {
                return Err(VaultError::InsufficientIdle { required: amount, available: idle });
            }
            let entry = &mut self.allocations.entries_mut()[i];
            let strategy = entry.address();
            push_to(entry, assets, vault, amount)?;
            self.record_strategy_deposit(strategy, amount);
        }

        // 4. Final snapshot.
        let allocations = self.allocations.snapshots();
        tracing::info!(
            %caller,
            withdrawn = plan.total_withdrawals(),
            deposited = plan.total_deposits(),
            "Rebalance complete."
        );
        self.emit(VaultEvent::Rebalanced { allocations: allocations.clone() });
        Ok(allocations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_plan_is_detected() {
        assert!(RebalancePlan::noop(3).is_noop());
        assert!(RebalancePlan::default().is_noop());
        assert!(!RebalancePlan::new(vec![0, 1], vec![0, 0]).is_noop());
    }

    #[test]
    fn totals_sum_each_side() {
        let plan = RebalancePlan::new(vec![10, 0, 5], vec![0, 12, 0]);
        assert_eq!(plan.total_withdrawals(), 15);
        assert_eq!(plan.total_deposits(), 12);
    }
}
