use crate::error::VaultError;
use crate::movement::pull_from;
use crate::reconcile::reconcile_entry;
use crate::vault::Vault;
use core_types::Address;
use events::VaultEvent;
use token::TokenLedger;

/// Indices of `balances` in ascending balance order. Ties keep table order.
pub fn liquidation_order(balances: &[u128]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..balances.len()).collect();
    order.sort_by_key(|&i| balances[i]);
    order
}

impl Vault {
    /// Burns `owner`'s shares to send exactly `amount` of underlying to `receiver`.
    /// Returns the shares burned.
    pub fn withdraw(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        amount: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<u128, VaultError> {
        self.ensure_can_withdraw(assets, amount, receiver, owner)?;
        let shares = self.preview_withdraw(assets, amount)?;
        self.ensure_can_spend(caller, owner, shares)?;

        self.atomically(assets, |vault, assets| {
            vault.ensure_liquidity(assets, amount)?;
            vault.settle_withdrawal(assets, caller, receiver, owner, amount, shares)
        })?;
        Ok(shares)
    }

    /// Burns exactly `shares` of `owner`'s shares and sends what they are worth to
    /// `receiver`. Returns the underlying paid out.
    pub fn redeem(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        shares: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<u128, VaultError> {
        self.ensure_can_withdraw(assets, shares, receiver, owner)?;
        let amount = self.preview_redeem(assets, shares)?;
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        self.ensure_can_spend(caller, owner, shares)?;

        self.atomically(assets, |vault, assets| {
            vault.ensure_liquidity(assets, amount)?;
            vault.settle_withdrawal(assets, caller, receiver, owner, amount, shares)
        })?;
        Ok(amount)
    }

    fn ensure_can_withdraw(
        &self,
        assets: &TokenLedger,
        amount: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<(), VaultError> {
        self.ensure_asset_ledger(assets)?;
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if receiver.is_zero() {
            return Err(VaultError::ZeroAddress("withdraw receiver"));
        }
        if owner.is_zero() {
            return Err(VaultError::ZeroAddress("share owner"));
        }
        Ok(())
    }

    fn ensure_can_spend(&self, caller: Address, owner: Address, shares: u128) -> Result<(), VaultError> {
        let available = self.shares.balance_of(&owner);
        if available < shares {
            return Err(VaultError::InsufficientShares { owner, required: shares, available });
        }
        if caller != owner {
            let allowed = self.shares.allowance(&owner, &caller);
            if allowed != u128::MAX && allowed < shares {
                return Err(VaultError::InsufficientAllowance {
                    owner,
                    spender: caller,
                    required: shares,
                    available: allowed,
                });
            }
        }
        Ok(())
    }

    /// Makes sure the idle balance covers `amount`, liquidating strategies if it does
    /// not. Fails before touching any strategy when the vault as a whole cannot cover it.
    ///
    /// A strategy that fails or under-delivers mid-walk fails the call; `withdraw`
    /// and `redeem` then roll back whatever was already pulled.
    pub(crate) fn ensure_liquidity(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<(), VaultError> {
        let idle = self.idle_balance(assets);
        if idle >= amount {
            return Ok(());
        }
        let shortfall = amount - idle;

        if self.paused {
            return Err(VaultError::InsufficientLiquidity { requested: amount, available: idle });
        }
        if self.multi_strategy_enabled {
            self.liquidate_strategies(assets, amount, shortfall)?;
        } else {
            self.liquidate_legacy(assets, amount, shortfall)?;
        }

        let idle = self.idle_balance(assets);
        if idle < amount {
            return Err(VaultError::InsufficientLiquidity { requested: amount, available: idle });
        }
        Ok(())
    }

    /// Lowest-balance-first walk over the allocation table.
    fn liquidate_strategies(&mut self, assets: &mut TokenLedger, amount: u128, shortfall: u128) -> Result<(), VaultError> {
        let live = self.live_balances(assets)?;
        let available = live
            .iter()
            .fold(self.idle_balance(assets), |acc, balance| acc.saturating_add(*balance));
        if available < amount {
            return Err(VaultError::InsufficientLiquidity { requested: amount, available });
        }

        let vault = self.address;
        let mut remaining = shortfall;
        for i in liquidation_order(&live) {
            if remaining == 0 {
                break;
            }
            let reconciliation = reconcile_entry(&mut self.allocations.entries_mut()[i], live[i]);
            self.record_reconciliation(&reconciliation);

            let take = remaining.min(live[i]);
            if take == 0 {
                continue;
            }
            let entry = &mut self.allocations.entries_mut()[i];
            let strategy = entry.address();
            let received = pull_from(entry, assets, vault, take)?;
            self.record_strategy_withdrawal(strategy, take, received);
            remaining = remaining.saturating_sub(received);
        }
        Ok(())
    }

    /// Single direct call to the legacy strategy.
    fn liquidate_legacy(&mut self, assets: &mut TokenLedger, amount: u128, shortfall: u128) -> Result<(), VaultError> {
        let vault = self.address;
        let idle = self.idle_balance(assets);
        let Some(entry) = self.legacy.as_mut() else {
            return Err(VaultError::InsufficientLiquidity { requested: amount, available: idle });
        };
        let live = entry.strategy.total_assets(assets)?;
        if live < shortfall {
            return Err(VaultError::InsufficientLiquidity {
                requested: amount,
                available: idle.saturating_add(live),
            });
        }

        let reconciliation = reconcile_entry(entry, live);
        let strategy = entry.address();
        let received = pull_from(entry, assets, vault, shortfall)?;
        self.record_reconciliation(&reconciliation);
        self.record_strategy_withdrawal(strategy, shortfall, received);
        Ok(())
    }

    fn settle_withdrawal(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        receiver: Address,
        owner: Address,
        amount: u128,
        shares: u128,
    ) -> Result<(), VaultError> {
        self.shares.spend_allowance(&owner, &caller, shares)?;
        self.shares.burn(&owner, shares)?;
        assets.transfer(&self.address, &receiver, amount)?;

        tracing::info!(%caller, %receiver, %owner, assets = amount, shares, "Withdrawal settled.");
        self.emit(VaultEvent::Withdraw { caller, receiver, owner, assets: amount, shares });
        Ok(())
    }
}
