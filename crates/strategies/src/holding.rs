use crate::error::StrategyError;
use crate::{Strategy, bind_vault, ensure_want};
use core_types::Address;
use token::TokenLedger;

/// A strategy that simply holds the underlying asset at its own address.
///
/// Whatever lands in its balance (vault deposits, rewards paid in by an external
/// protocol) is what it manages; anything removed from it is a loss.
#[derive(Debug, Clone)]
pub struct HoldingStrategy {
    address: Address,
    want: Address,
    vault: Option<Address>,
}

impl HoldingStrategy {
    pub fn new(address: Address, want: Address) -> Result<Self, StrategyError> {
        if address.is_zero() || want.is_zero() {
            return Err(StrategyError::InvalidParameters(
                "holding strategy needs a nonzero address and asset".to_string(),
            ));
        }
        Ok(Self { address, want, vault: None })
    }

    fn bound_vault(&self) -> Result<Address, StrategyError> {
        self.vault.ok_or(StrategyError::VaultNotSet(self.address))
    }
}

impl Strategy for HoldingStrategy {
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

    fn total_assets(&self, assets: &TokenLedger) -> Result<u128, StrategyError> {
        ensure_want(self, assets)?;
        Ok(assets.balance_of(&self.address))
    }

    fn deposit(&mut self, assets: &mut TokenLedger) -> Result<(), StrategyError> {
        // The funds are already in our balance; nothing else to do.
        ensure_want(self, assets)
    }

    fn withdraw(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<u128, StrategyError> {
        ensure_want(self, assets)?;
        let vault = self.bound_vault()?;
        let available = assets.balance_of(&self.address);
        if amount > available {
            return Err(StrategyError::InsufficientBalance {
                strategy: self.address,
                requested: amount,
                available,
            });
        }
        assets.transfer(&self.address, &vault, amount)?;
        Ok(amount)
    }

    fn withdraw_all(&mut self, assets: &mut TokenLedger) -> Result<u128, StrategyError> {
        ensure_want(self, assets)?;
        let vault = self.bound_vault()?;
        let balance = assets.balance_of(&self.address);
        assets.transfer(&self.address, &vault, balance)?;
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET: u64 = 0xAA;

    fn setup() -> (HoldingStrategy, TokenLedger, Address) {
        let vault = Address::from_low_u64(1);
        let mut strategy = HoldingStrategy::new(Address::from_low_u64(0x10), Address::from_low_u64(ASSET)).unwrap();
        strategy.set_vault(vault).unwrap();
        (strategy, TokenLedger::new(Address::from_low_u64(ASSET)), vault)
    }

    #[test]
    fn balance_tracks_the_ledger_including_external_yield() {
        let (strategy, mut assets, _) = setup();
        assets.mint(&strategy.address(), 1_000).unwrap();
        assert_eq!(strategy.total_assets(&assets).unwrap(), 1_000);

        assets.mint(&strategy.address(), 100).unwrap();
        assert_eq!(strategy.total_assets(&assets).unwrap(), 1_100);
    }

    #[test]
    fn withdraw_releases_to_the_bound_vault() {
        let (mut strategy, mut assets, vault) = setup();
        assets.mint(&strategy.address(), 500).unwrap();

        assert_eq!(strategy.withdraw(&mut assets, 200).unwrap(), 200);
        assert_eq!(assets.balance_of(&vault), 200);
        assert_eq!(strategy.withdraw_all(&mut assets).unwrap(), 300);
        assert_eq!(strategy.total_assets(&assets).unwrap(), 0);
    }

    #[test]
    fn over_withdrawal_is_rejected() {
        let (mut strategy, mut assets, _) = setup();
        assets.mint(&strategy.address(), 50).unwrap();
        let err = strategy.withdraw(&mut assets, 51).unwrap_err();
        assert!(matches!(err, StrategyError::InsufficientBalance { available: 50, .. }));
    }

    #[test]
    fn vault_binding_happens_once() {
        let (mut strategy, _, _) = setup();
        let err = strategy.set_vault(Address::from_low_u64(2)).unwrap_err();
        assert!(matches!(err, StrategyError::VaultAlreadySet { .. }));
    }

    #[test]
    fn foreign_ledgers_are_rejected() {
        let (strategy, _, _) = setup();
        let other = TokenLedger::new(Address::from_low_u64(0xBB));
        assert!(matches!(strategy.total_assets(&other), Err(StrategyError::AssetMismatch { .. })));
    }
}
