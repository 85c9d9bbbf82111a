//! # Strata Token Crate
//!
//! This crate provides `TokenLedger`, the in-memory state machine of a standard
//! fungible token: balances, allowances and total supply.
//!
//! ## Architectural Principles
//!
//! - **One ledger, two uses:** The underlying asset is a `TokenLedger` that is
//!   injected into every vault operation, and the vault's own shares are a
//!   `TokenLedger` owned by the vault. Neither knows about the other.
//! - **All-or-nothing mutations:** Every method validates before it writes, so a
//!   returned error always means the ledger is unchanged.
//!
//! ## Public API
//!
//! - `TokenLedger`: The balance and allowance state machine.
//! - `TokenError`: The specific error types that can be returned from this crate.

pub mod error;
pub mod ledger;

pub use error::TokenError;
pub use ledger::TokenLedger;
