use crate::error::StrategyError;
use core_types::{Address, Rounding, mul_div};
use token::TokenLedger;

/// A minimal share-issuing vault a `ForwardingStrategy` parks its funds in.
///
/// It stands in for an external yield protocol: the underlying lives at the child's
/// address, and anything minted there raises the value of every outstanding share.
#[derive(Debug, Clone)]
pub struct ChildVault {
    address: Address,
    shares: TokenLedger,
}

impl ChildVault {
    pub fn new(address: Address) -> Result<Self, StrategyError> {
        if address.is_zero() {
            return Err(StrategyError::InvalidParameters(
                "child vault must not be the zero address".to_string(),
            ));
        }
        Ok(Self { address, shares: TokenLedger::new(address) })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn total_assets(&self, assets: &TokenLedger) -> u128 {
        assets.balance_of(&self.address)
    }

    pub fn total_shares(&self) -> u128 {
        self.shares.total_supply()
    }

    pub fn shares_of(&self, holder: &Address) -> u128 {
        self.shares.balance_of(holder)
    }

    /// The underlying `holder`'s shares currently redeem for, rounded down.
    pub fn assets_of(&self, assets: &TokenLedger, holder: &Address) -> Result<u128, StrategyError> {
        self.to_assets(assets, self.shares_of(holder), Rounding::Down)
    }

    fn to_shares(&self, assets: &TokenLedger, amount: u128, rounding: Rounding) -> Result<u128, StrategyError> {
        let supply = self.total_shares();
        if supply == 0 {
            return Ok(amount);
        }
        Ok(mul_div(amount, supply, self.total_assets(assets), rounding)?)
    }

    fn to_assets(&self, assets: &TokenLedger, shares: u128, rounding: Rounding) -> Result<u128, StrategyError> {
        let supply = self.total_shares();
        if supply == 0 {
            return Ok(shares);
        }
        Ok(mul_div(shares, self.total_assets(assets), supply, rounding)?)
    }

    /// Shares a deposit of `amount` would mint, rounded down. Fails if that is zero.
    pub fn preview_deposit(&self, assets: &TokenLedger, amount: u128) -> Result<u128, StrategyError> {
        let shares = self.to_shares(assets, amount, Rounding::Down)?;
        if shares == 0 && amount > 0 {
            return Err(StrategyError::InvalidParameters(format!(
                "deposit of {} into child vault {} would mint zero shares",
                amount, self.address
            )));
        }
        Ok(shares)
    }

    /// Pulls `amount` from `from` and credits `receiver` with shares. Returns the shares minted.
    pub fn deposit(
        &mut self,
        assets: &mut TokenLedger,
        from: &Address,
        amount: u128,
        receiver: &Address,
    ) -> Result<u128, StrategyError> {
        if amount == 0 {
            return Ok(0);
        }
        let shares = self.preview_deposit(assets, amount)?;
        assets.transfer(from, &self.address, amount)?;
        self.shares.mint(receiver, shares)?;
        Ok(shares)
    }

    /// Sends exactly `amount` to `receiver`, burning the shares of `owner` that cover it.
    /// Returns the shares burned.
    pub fn withdraw(
        &mut self,
        assets: &mut TokenLedger,
        owner: &Address,
        amount: u128,
        receiver: &Address,
    ) -> Result<u128, StrategyError> {
        if amount == 0 {
            return Ok(0);
        }
        let shares = self.to_shares(assets, amount, Rounding::Up)?;
        self.shares.burn(owner, shares)?;
        assets.transfer(&self.address, receiver, amount)?;
        Ok(shares)
    }

    /// Burns all of `owner`'s shares and sends what they are worth to `receiver`.
    pub fn redeem_all(
        &mut self,
        assets: &mut TokenLedger,
        owner: &Address,
        receiver: &Address,
    ) -> Result<u128, StrategyError> {
        let shares = self.shares_of(owner);
        let amount = self.to_assets(assets, shares, Rounding::Down)?;
        self.shares.burn(owner, shares)?;
        assets.transfer(&self.address, receiver, amount)?;
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ChildVault, TokenLedger, Address) {
        let depositor = Address::from_low_u64(0x10);
        let mut assets = TokenLedger::new(Address::from_low_u64(0xAA));
        assets.mint(&depositor, 10_000).unwrap();
        (ChildVault::new(Address::from_low_u64(0x20)).unwrap(), assets, depositor)
    }

    #[test]
    fn first_deposit_bootstraps_one_to_one() {
        let (mut child, mut assets, depositor) = setup();
        let minted = child.deposit(&mut assets, &depositor, 1_000, &depositor).unwrap();
        assert_eq!(minted, 1_000);
        assert_eq!(child.assets_of(&assets, &depositor).unwrap(), 1_000);
    }

    #[test]
    fn yield_accrues_to_share_holders() {
        let (mut child, mut assets, depositor) = setup();
        child.deposit(&mut assets, &depositor, 1_000, &depositor).unwrap();
        assets.mint(&child.address(), 250).unwrap();
        assert_eq!(child.assets_of(&assets, &depositor).unwrap(), 1_250);

        // Later deposits buy fewer shares at the higher price.
        let minted = child.deposit(&mut assets, &depositor, 500, &depositor).unwrap();
        assert_eq!(minted, 400);
    }

    #[test]
    fn deposits_too_small_for_one_share_are_refused() {
        let (mut child, mut assets, depositor) = setup();
        child.deposit(&mut assets, &depositor, 1, &depositor).unwrap();
        // One share now backs 1001 assets.
        assets.mint(&child.address(), 1_000).unwrap();

        assert!(matches!(child.preview_deposit(&assets, 1_000), Err(StrategyError::InvalidParameters(_))));
        assert_eq!(child.preview_deposit(&assets, 1_001).unwrap(), 1);
        assert!(child.deposit(&mut assets, &depositor, 1_000, &depositor).is_err());
        assert_eq!(assets.balance_of(&depositor), 9_999);
    }

    #[test]
    fn withdraw_rounds_burned_shares_up() {
        let (mut child, mut assets, depositor) = setup();
        child.deposit(&mut assets, &depositor, 300, &depositor).unwrap();
        assets.mint(&child.address(), 100).unwrap();

        // 400 assets back 300 shares: 1 asset costs 0.75 shares, charged as 1.
        let burned = child.withdraw(&mut assets, &depositor, 1, &depositor).unwrap();
        assert_eq!(burned, 1);
        assert_eq!(child.shares_of(&depositor), 299);
    }

    #[test]
    fn redeem_all_empties_the_position() {
        let (mut child, mut assets, depositor) = setup();
        child.deposit(&mut assets, &depositor, 700, &depositor).unwrap();
        assets.mint(&child.address(), 70).unwrap();

        assert_eq!(child.redeem_all(&mut assets, &depositor, &depositor).unwrap(), 770);
        assert_eq!(child.total_shares(), 0);
        assert_eq!(assets.balance_of(&depositor), 10_070);
    }
}
