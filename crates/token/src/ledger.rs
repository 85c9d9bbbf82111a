use crate::error::TokenError;
use core_types::Address;
use std::collections::HashMap;

/// Tracks the balances, allowances and total supply of a single fungible token.
/// Its sole responsibility is to apply transfers, mints and burns consistently.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    token: Address,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
}

impl TokenLedger {
    /// Creates an empty ledger for the token identified by `token`.
    pub fn new(token: Address) -> Self {
        Self {
            token,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// The identifier of the token this ledger accounts for.
    pub fn token(&self) -> Address {
        self.token
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Creates `amount` new tokens in `to`'s balance.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress("mint receiver"));
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { token: self.token })?;

        self.total_supply = new_supply;
        // A balance can never exceed the supply, so this addition cannot overflow.
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    /// Destroys `amount` tokens from `from`'s balance.
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError> {
        self.ensure_balance(from, amount)?;
        self.debit(from, amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Moves `amount` tokens from `from` to `to`.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress("transfer receiver"));
        }
        self.ensure_balance(from, amount)?;

        self.debit(from, amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        tracing::trace!(token = %self.token, %from, %to, amount, "Token transfer.");
        Ok(())
    }

    /// Sets the amount `spender` may move out of `owner`'s balance.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), TokenError> {
        if owner.is_zero() {
            return Err(TokenError::ZeroAddress("approval owner"));
        }
        if spender.is_zero() {
            return Err(TokenError::ZeroAddress("approval spender"));
        }
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    /// Checks that `spender` may move `amount` out of `owner`'s balance without
    /// consuming the allowance. An owner can always spend its own balance.
    pub fn ensure_allowance(&self, owner: &Address, spender: &Address, amount: u128) -> Result<(), TokenError> {
        if owner == spender {
            return Ok(());
        }
        let available = self.allowance(owner, spender);
        if available == u128::MAX || available >= amount {
            return Ok(());
        }
        Err(TokenError::InsufficientAllowance {
            owner: *owner,
            spender: *spender,
            required: amount,
            available,
        })
    }

    /// Consumes `amount` of the allowance granted by `owner` to `spender`.
    /// An unlimited (`u128::MAX`) allowance is never decremented.
    pub fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), TokenError> {
        self.ensure_allowance(owner, spender, amount)?;
        if owner == spender {
            return Ok(());
        }
        if let Some(current) = self.allowances.get_mut(&(*owner, *spender)) {
            if *current != u128::MAX {
                *current -= amount;
            }
        }
        Ok(())
    }

    /// Checks that `account` holds at least `amount`.
    pub fn ensure_balance(&self, account: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: *account,
                required: amount,
                available,
            });
        }
        Ok(())
    }

    fn debit(&mut self, account: &Address, amount: u128) {
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(account);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> (TokenLedger, Address, Address) {
        let mut ledger = TokenLedger::new(Address::from_low_u64(0xAA));
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);
        ledger.mint(&alice, 1_000).unwrap();
        (ledger, alice, bob)
    }

    #[test]
    fn mint_transfer_and_burn_keep_supply_consistent() {
        let (mut ledger, alice, bob) = ledger();
        ledger.transfer(&alice, &bob, 400).unwrap();
        ledger.burn(&bob, 100).unwrap();

        assert_eq!(ledger.balance_of(&alice), 600);
        assert_eq!(ledger.balance_of(&bob), 300);
        assert_eq!(ledger.total_supply(), 900);
    }

    #[test]
    fn failed_transfer_leaves_balances_untouched() {
        let (mut ledger, alice, bob) = ledger();
        let err = ledger.transfer(&alice, &bob, 1_001).unwrap_err();

        assert!(matches!(err, TokenError::InsufficientBalance { required: 1_001, available: 1_000, .. }));
        assert_eq!(ledger.balance_of(&alice), 1_000);
        assert_eq!(ledger.balance_of(&bob), 0);
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let (mut ledger, alice, bob) = ledger();
        ledger.approve(&alice, &bob, u128::MAX).unwrap();
        ledger.spend_allowance(&alice, &bob, 500).unwrap();
        assert_eq!(ledger.allowance(&alice, &bob), u128::MAX);
    }

    #[test]
    fn zero_receivers_are_rejected() {
        let (mut ledger, alice, _) = ledger();
        assert_eq!(
            ledger.transfer(&alice, &Address::ZERO, 1),
            Err(TokenError::ZeroAddress("transfer receiver"))
        );
        assert_eq!(ledger.mint(&Address::ZERO, 1), Err(TokenError::ZeroAddress("mint receiver")));
    }
}
