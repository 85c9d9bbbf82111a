use crate::child_vault::ChildVault;
use crate::error::StrategyError;
use crate::{Strategy, StrategyCapabilities, bind_vault, ensure_want};
use core_types::Address;
use token::TokenLedger;

/// A strategy that forwards its funds into a `ChildVault` and holds the child's shares.
///
/// Funds the vault transfers in sit loose at the strategy address until `deposit`,
/// `deposit_exact` or `harvest` pushes them into the child.
#[derive(Debug, Clone)]
pub struct ForwardingStrategy {
    address: Address,
    want: Address,
    vault: Option<Address>,
    child: ChildVault,
}

impl ForwardingStrategy {
    pub fn new(address: Address, want: Address, child: ChildVault) -> Result<Self, StrategyError> {
        if address.is_zero() || want.is_zero() {
            return Err(StrategyError::InvalidParameters(
                "forwarding strategy needs a nonzero address and asset".to_string(),
            ));
        }
        if child.address() == address {
            return Err(StrategyError::InvalidParameters(
                "forwarding strategy cannot forward into itself".to_string(),
            ));
        }
        Ok(Self { address, want, vault: None, child })
    }

    pub fn child(&self) -> &ChildVault {
        &self.child
    }

    /// Funds transferred in but not yet forwarded.
    pub fn loose_balance(&self, assets: &TokenLedger) -> u128 {
        assets.balance_of(&self.address)
    }

    fn bound_vault(&self) -> Result<Address, StrategyError> {
        self.vault.ok_or(StrategyError::VaultNotSet(self.address))
    }

    fn forward(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<(), StrategyError> {
        if amount == 0 {
            return Ok(());
        }
        let shares = self.child.deposit(assets, &self.address, amount, &self.address)?;
        tracing::debug!(strategy = %self.address, child = %self.child.address(), amount, shares, "Forwarded funds to child vault.");
        Ok(())
    }
}

impl Strategy for ForwardingStrategy {
    fn address(&self) -> Address {
        self.address
    }

    fn want(&self) -> Address {
        self.want
    }

    fn vault(&self) -> Option<Address> {
        self.vault
    }

    fn set_vault(&mut self, vault: Address) -> Result<(), StrategyError> {
        bind_vault(self.address, &mut self.vault, vault)
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities { exact_deposit: true, harvest: true }
    }

    fn total_assets(&self, assets: &TokenLedger) -> Result<u128, StrategyError> {
        ensure_want(self, assets)?;
        let forwarded = self.child.assets_of(assets, &self.address)?;
        Ok(self.loose_balance(assets).saturating_add(forwarded))
    }

    fn check_deposit(&self, assets: &TokenLedger, amount: u128) -> Result<(), StrategyError> {
        ensure_want(self, assets)?;
        self.child.preview_deposit(assets, amount)?;
        Ok(())
    }

    fn deposit(&mut self, assets: &mut TokenLedger) -> Result<(), StrategyError> {
        ensure_want(self, assets)?;
        let loose = self.loose_balance(assets);
        self.forward(assets, loose)
    }

    fn deposit_exact(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<(), StrategyError> {
        ensure_want(self, assets)?;
        let loose = self.loose_balance(assets);
        if amount > loose {
            return Err(StrategyError::InsufficientBalance {
                strategy: self.address,
                requested: amount,
                available: loose,
            });
        }
        self.forward(assets, amount)
    }

    fn withdraw(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<u128, StrategyError> {
        ensure_want(self, assets)?;
        let vault = self.bound_vault()?;
        let available = self.total_assets(assets)?;
        if amount > available {
            return Err(StrategyError::InsufficientBalance {
                strategy: self.address,
                requested: amount,
                available,
            });
        }

        // Loose funds first, then pull the remainder straight from the child.
        let from_loose = amount.min(self.loose_balance(assets));
        assets.transfer(&self.address, &vault, from_loose)?;
        let remainder = amount - from_loose;
        if remainder > 0 {
            self.child.withdraw(assets, &self.address, remainder, &vault)?;
        }
        Ok(amount)
    }

    fn withdraw_all(&mut self, assets: &mut TokenLedger) -> Result<u128, StrategyError> {
        ensure_want(self, assets)?;
        let vault = self.bound_vault()?;
        let loose = self.loose_balance(assets);
        assets.transfer(&self.address, &vault, loose)?;
        let redeemed = self.child.redeem_all(assets, &self.address, &vault)?;
        Ok(loose.saturating_add(redeemed))
    }

    fn harvest(&mut self, assets: &mut TokenLedger) -> Result<(), StrategyError> {
        // Rewards paid to the strategy address are compounded into the child.
        self.deposit(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET: u64 = 0xAA;

    fn setup() -> (ForwardingStrategy, TokenLedger, Address) {
        let vault = Address::from_low_u64(1);
        let child = ChildVault::new(Address::from_low_u64(0x20)).unwrap();
        let mut strategy =
            ForwardingStrategy::new(Address::from_low_u64(0x11), Address::from_low_u64(ASSET), child).unwrap();
        strategy.set_vault(vault).unwrap();
        let mut assets = TokenLedger::new(Address::from_low_u64(ASSET));
        assets.mint(&vault, 10_000).unwrap();
        (strategy, assets, vault)
    }

    fn fund(strategy: &ForwardingStrategy, assets: &mut TokenLedger, vault: &Address, amount: u128) {
        assets.transfer(vault, &strategy.address(), amount).unwrap();
    }

    #[test]
    fn deposit_sweeps_loose_funds_into_the_child() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1_000);
        strategy.deposit(&mut assets).unwrap();

        assert_eq!(strategy.loose_balance(&assets), 0);
        assert_eq!(strategy.child().total_assets(&assets), 1_000);
        assert_eq!(strategy.total_assets(&assets).unwrap(), 1_000);
    }

    #[test]
    fn deposit_exact_leaves_the_rest_loose() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1_000);
        strategy.deposit_exact(&mut assets, 600).unwrap();

        assert_eq!(strategy.loose_balance(&assets), 400);
        assert_eq!(strategy.total_assets(&assets).unwrap(), 1_000);
        assert!(strategy.deposit_exact(&mut assets, 401).is_err());
    }

    #[test]
    fn child_yield_shows_up_in_total_assets() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1_000);
        strategy.deposit(&mut assets).unwrap();
        assets.mint(&strategy.child().address(), 100).unwrap();

        assert_eq!(strategy.total_assets(&assets).unwrap(), 1_100);
    }

    #[test]
    fn withdraw_uses_loose_funds_before_the_child() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1_000);
        strategy.deposit_exact(&mut assets, 800).unwrap();

        let before = assets.balance_of(&vault);
        assert_eq!(strategy.withdraw(&mut assets, 500).unwrap(), 500);
        assert_eq!(assets.balance_of(&vault), before + 500);
        assert_eq!(strategy.loose_balance(&assets), 0);
        assert_eq!(strategy.child().total_assets(&assets), 500);
    }

    #[test]
    fn withdraw_all_returns_everything_including_yield() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1_000);
        strategy.deposit_exact(&mut assets, 900).unwrap();
        assets.mint(&strategy.child().address(), 90).unwrap();

        assert_eq!(strategy.withdraw_all(&mut assets).unwrap(), 1_090);
        assert_eq!(strategy.total_assets(&assets).unwrap(), 0);
        assert_eq!(assets.balance_of(&vault), 10_090);
    }

    #[test]
    fn harvest_compounds_rewards_paid_to_the_strategy() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1_000);
        strategy.deposit(&mut assets).unwrap();
        assets.mint(&strategy.address(), 25).unwrap();

        strategy.harvest(&mut assets).unwrap();
        assert_eq!(strategy.loose_balance(&assets), 0);
        assert_eq!(strategy.total_assets(&assets).unwrap(), 1_025);
    }

    #[test]
    fn check_deposit_refuses_what_the_child_would_refuse() {
        let (mut strategy, mut assets, vault) = setup();
        fund(&strategy, &mut assets, &vault, 1);
        strategy.deposit(&mut assets).unwrap();
        assets.mint(&strategy.child().address(), 1_000).unwrap();

        assert!(strategy.check_deposit(&assets, 1).is_err());
        assert!(strategy.check_deposit(&assets, 1_001).is_ok());
        assert!(strategy.check_deposit(&TokenLedger::new(Address::from_low_u64(0xBB)), 1_001).is_err());
    }

    #[test]
    fn advertises_both_optional_capabilities() {
        let (strategy, _, _) = setup();
        assert_eq!(strategy.capabilities(), StrategyCapabilities { exact_deposit: true, harvest: true });
    }
}
