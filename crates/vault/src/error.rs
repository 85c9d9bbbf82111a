use core_types::{Address, CoreError, Role};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("The zero address cannot be used as {0}")]
    ZeroAddress(&'static str),

    #[error("Operation would move {assets} assets for zero shares")]
    ZeroShares { assets: u128 },

    #[error("Weight {0} bps is above the 10000 bps maximum")]
    InvalidWeight(u16),

    #[error("Rebalance plan has {withdrawals} withdrawals and {deposits} deposits for {strategies} strategies")]
    PlanLengthMismatch {
        strategies: usize,
        withdrawals: usize,
        deposits: usize,
    },

    #[error("{caller} is not authorized; requires role {role}")]
    NotAuthorized { caller: Address, role: Role },

    #[error("Strategy {0} is not registered with the vault")]
    StrategyNotFound(Address),

    #[error("Insufficient liquidity. Requested: {requested}, Available: {available}")]
    InsufficientLiquidity { requested: u128, available: u128 },

    #[error("Strategy {strategy} still holds {balance}; drain it first")]
    StrategyNotDrained { strategy: Address, balance: u128 },

    #[error("Insufficient shares for {owner}. Required: {required}, Available: {available}")]
    InsufficientShares {
        owner: Address,
        required: u128,
        available: u128,
    },

    #[error("Insufficient share allowance from {owner} to {spender}. Required: {required}, Available: {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: u128,
        available: u128,
    },

    #[error("Plan withdraws {requested} from strategy {strategy}, which holds {available}")]
    PlanExceedsStrategyBalance {
        strategy: Address,
        requested: u128,
        available: u128,
    },

    #[error("Insufficient idle balance. Required: {required}, Available: {available}")]
    InsufficientIdle { required: u128, available: u128 },

    #[error("Asset mismatch. Vault asset: {expected}, Found: {found}")]
    AssetMismatch { expected: Address, found: Address },

    #[error("Strategy cannot live at {0}, the vault or asset address")]
    ReservedStrategyAddress(Address),

    #[error("Strategy {strategy} is bound to vault {vault}")]
    StrategyVaultMismatch { strategy: Address, vault: Address },

    #[error("Vault is paused")]
    Paused,

    #[error("Vault is not paused")]
    NotPaused,

    #[error("Multi-strategy mode is disabled")]
    MultiStrategyDisabled,

    #[error("Strategy {0} is already registered")]
    DuplicateStrategy(Address),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Token error: {0}")]
    Token(#[from] token::TokenError),

    #[error("Calculation error: {0}")]
    Core(#[from] CoreError),
}
