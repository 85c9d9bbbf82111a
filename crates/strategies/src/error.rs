use core_types::{Address, CoreError};
use thiserror::Error;
use token::TokenError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Strategy {strategy} is already bound to vault {vault}")]
    VaultAlreadySet { strategy: Address, vault: Address },

    #[error("Strategy {0} is not bound to a vault")]
    VaultNotSet(Address),

    #[error("Strategy {strategy} wants asset {expected} but was handed a ledger for {found}")]
    AssetMismatch {
        strategy: Address,
        expected: Address,
        found: Address,
    },

    #[error("Strategy {strategy} cannot release {requested}; it manages {available}")]
    InsufficientBalance {
        strategy: Address,
        requested: u128,
        available: u128,
    },

    #[error("Strategy does not support '{0}'")]
    Unsupported(&'static str),

    #[error("Token error inside strategy: {0}")]
    Token(#[from] TokenError),

    #[error("Calculation error inside strategy: {0}")]
    Core(#[from] CoreError),
}
