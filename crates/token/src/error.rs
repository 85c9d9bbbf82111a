use core_types::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("The zero address cannot be used as {0}")]
    ZeroAddress(&'static str),

    #[error("Insufficient balance for {account}. Required: {required}, Available: {available}")]
    InsufficientBalance {
        account: Address,
        required: u128,
        available: u128,
    },

    #[error("Insufficient allowance from {owner} to {spender}. Required: {required}, Available: {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: u128,
        available: u128,
    },

    #[error("Total supply of {token} would overflow")]
    SupplyOverflow { token: Address },
}
