use crate::error::VaultError;
use crate::movement::push_to;
use crate::vault::Vault;
use core_types::{Address, CoreError, Rounding, mul_div, ratio};
use events::VaultEvent;
use rust_decimal::Decimal;
use token::TokenLedger;

impl Vault {
    /// Total underlying the shares are backed by.
    ///
    /// - Paused: the idle balance only.
    /// - Multi-strategy: idle plus every strategy's live balance.
    /// - Single-strategy: idle plus the legacy strategy's live balance.
    pub fn total_assets(&self, assets: &TokenLedger) -> Result<u128, VaultError> {
        self.ensure_asset_ledger(assets)?;
        let idle = self.idle_balance(assets);
        if self.paused {
            return Ok(idle);
        }

        let deployed: Vec<u128> = if self.multi_strategy_enabled {
            self.live_balances(assets)?
        } else {
            match &self.legacy {
                Some(entry) => vec![entry.strategy.total_assets(assets)?],
                None => Vec::new(),
            }
        };
        deployed.into_iter().try_fold(idle, |total, balance| {
            total
                .checked_add(balance)
                .ok_or_else(|| VaultError::Core(CoreError::Calculation("total assets overflow u128".to_string())))
        })
    }

    pub fn total_supply(&self) -> u128 {
        self.shares.total_supply()
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.shares.balance_of(holder)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.shares.allowance(owner, spender)
    }

    /// Lets `spender` withdraw or redeem up to `shares` of `owner`'s shares.
    pub fn approve(&mut self, owner: Address, spender: Address, shares: u128) -> Result<(), VaultError> {
        self.shares.approve(&owner, &spender, shares)?;
        Ok(())
    }

    fn shares_for(&self, total_assets: u128, amount: u128, rounding: Rounding) -> Result<u128, VaultError> {
        let supply = self.shares.total_supply();
        if supply == 0 {
            return Ok(amount);
        }
        Ok(mul_div(amount, supply, total_assets, rounding)?)
    }

    fn assets_for(&self, total_assets: u128, shares: u128, rounding: Rounding) -> Result<u128, VaultError> {
        let supply = self.shares.total_supply();
        if supply == 0 {
            return Ok(shares);
        }
        Ok(mul_div(shares, total_assets, supply, rounding)?)
    }

    pub fn convert_to_shares(&self, assets: &TokenLedger, amount: u128) -> Result<u128, VaultError> {
        self.shares_for(self.total_assets(assets)?, amount, Rounding::Down)
    }

    pub fn convert_to_assets(&self, assets: &TokenLedger, shares: u128) -> Result<u128, VaultError> {
        self.assets_for(self.total_assets(assets)?, shares, Rounding::Down)
    }

    /// Shares a deposit of `amount` mints. Rounds down.
    pub fn preview_deposit(&self, assets: &TokenLedger, amount: u128) -> Result<u128, VaultError> {
        self.shares_for(self.total_assets(assets)?, amount, Rounding::Down)
    }

    /// Underlying needed to mint `shares`. Rounds up.
    pub fn preview_mint(&self, assets: &TokenLedger, shares: u128) -> Result<u128, VaultError> {
        self.assets_for(self.total_assets(assets)?, shares, Rounding::Up)
    }

    /// Shares burned to withdraw `amount`. Rounds up.
    pub fn preview_withdraw(&self, assets: &TokenLedger, amount: u128) -> Result<u128, VaultError> {
        self.shares_for(self.total_assets(assets)?, amount, Rounding::Up)
    }

    /// Underlying paid out for redeeming `shares`. Rounds down.
    pub fn preview_redeem(&self, assets: &TokenLedger, shares: u128) -> Result<u128, VaultError> {
        self.assets_for(self.total_assets(assets)?, shares, Rounding::Down)
    }

    pub fn max_deposit(&self) -> u128 {
        if self.paused { 0 } else { u128::MAX }
    }

    pub fn max_mint(&self) -> u128 {
        self.max_deposit()
    }

    pub fn max_withdraw(&self, assets: &TokenLedger, owner: &Address) -> Result<u128, VaultError> {
        self.convert_to_assets(assets, self.shares.balance_of(owner))
    }

    pub fn max_redeem(&self, owner: &Address) -> u128 {
        self.shares.balance_of(owner)
    }

    /// Underlying per share, 1.0 while no shares exist.
    pub fn share_price(&self, assets: &TokenLedger) -> Result<Decimal, VaultError> {
        let supply = self.shares.total_supply();
        if supply == 0 {
            return Ok(Decimal::ONE);
        }
        Ok(ratio(self.total_assets(assets)?, supply)?)
    }

    /// Deposits `amount` of `caller`'s underlying and mints shares to `receiver`.
    /// Returns the shares minted.
    pub fn deposit(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        amount: u128,
        receiver: Address,
    ) -> Result<u128, VaultError> {
        self.ensure_can_deposit(assets, amount, receiver)?;
        self.atomically(assets, |vault, assets| {
            vault.harvest_legacy(assets)?;
            let shares = vault.preview_deposit(assets, amount)?;
            if shares == 0 {
                return Err(VaultError::ZeroShares { assets: amount });
            }
            vault.settle_deposit(assets, caller, receiver, amount, shares)?;
            Ok(shares)
        })
    }

    /// Mints exactly `shares` to `receiver`, pulling whatever underlying they cost
    /// from `caller`. Returns the underlying spent.
    pub fn mint(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        shares: u128,
        receiver: Address,
    ) -> Result<u128, VaultError> {
        self.ensure_can_deposit(assets, shares, receiver)?;
        self.atomically(assets, |vault, assets| {
            vault.harvest_legacy(assets)?;
            let amount = vault.preview_mint(assets, shares)?;
            if amount == 0 {
                return Err(VaultError::ZeroAmount);
            }
            vault.settle_deposit(assets, caller, receiver, amount, shares)?;
            Ok(amount)
        })
    }

    fn ensure_can_deposit(&self, assets: &TokenLedger, amount: u128, receiver: Address) -> Result<(), VaultError> {
        self.ensure_asset_ledger(assets)?;
        if self.paused {
            return Err(VaultError::Paused);
        }
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if receiver.is_zero() {
            return Err(VaultError::ZeroAddress("deposit receiver"));
        }
        Ok(())
    }

    /// In single-strategy mode, lets the strategy realize pending yield before new
    /// shares are priced.
    fn harvest_legacy(&mut self, assets: &mut TokenLedger) -> Result<(), VaultError> {
        if self.multi_strategy_enabled {
            return Ok(());
        }
        if let Some(entry) = self.legacy.as_mut() {
            if entry.capabilities.harvest {
                entry.strategy.harvest(assets)?;
                tracing::debug!(strategy = %entry.address(), "Harvested legacy strategy before deposit.");
            }
        }
        Ok(())
    }

    fn settle_deposit(
        &mut self,
        assets: &mut TokenLedger,
        caller: Address,
        receiver: Address,
        amount: u128,
        shares: u128,
    ) -> Result<(), VaultError> {
        assets.transfer(&caller, &self.address, amount)?;

        if !self.multi_strategy_enabled {
            self.forward_to_legacy(assets, amount)?;
        }

        self.shares.mint(&receiver, shares)?;
        tracing::info!(%caller, %receiver, assets = amount, shares, "Deposit settled.");
        self.emit(VaultEvent::Deposit { caller, receiver, assets: amount, shares });
        Ok(())
    }

    /// Pushes a fresh deposit straight into the legacy strategy.
    fn forward_to_legacy(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<(), VaultError> {
        let vault = self.address;
        let Some(entry) = self.legacy.as_mut() else {
            return Ok(());
        };
        let strategy = entry.address();
        entry.strategy.check_deposit(assets, amount)?;
        push_to(entry, assets, vault, amount)?;
        self.record_strategy_deposit(strategy, amount);
        Ok(())
    }
}
