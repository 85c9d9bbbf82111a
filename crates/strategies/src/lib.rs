//! # Strata Strategy Library
//!
//! This crate defines the capability contract every yield strategy exposes to the
//! vault, and provides the two concrete adapters the workspace ships with.
//!
//! ## Architectural Principles
//!
//! - **Narrow capability surface:** The vault only ever asks a strategy for its
//!   live balance, hands it funds, and asks for funds back. Everything else a
//!   strategy does is its own business.
//! - **Injected asset state:** The underlying token is a `TokenLedger` passed into
//!   every call rather than a global, so a strategy can only move funds the caller
//!   lets it see.
//! - **Negotiated, not probed:** Optional behaviour is advertised once through
//!   `StrategyCapabilities`; the vault records the flags at registration and never
//!   has to try a call to find out whether it is supported.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `StrategyClone`: Snapshots a boxed strategy; implemented for every `Clone` strategy.
//! - `StrategyCapabilities`: The optional calls a strategy supports.
//! - `HoldingStrategy`, `ForwardingStrategy`, `ChildVault`: The concrete adapters.
//! - `create_strategy`: The factory function to construct a strategy from configuration.

// Declare all the modules that constitute this crate.
pub mod child_vault;
pub mod error;
pub mod factory;
pub mod forwarding;
pub mod holding;

// Re-export the key components to create a clean, public-facing API.
pub use child_vault::ChildVault;
pub use error::StrategyError;
pub use factory::create_strategy;
pub use forwarding::ForwardingStrategy;
pub use holding::HoldingStrategy;

use core_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use token::TokenLedger;

/// Optional calls a strategy supports beyond the base contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCapabilities {
    /// `deposit_exact` puts exactly the given amount to work instead of sweeping
    /// every loose unit the strategy holds.
    pub exact_deposit: bool,
    /// `harvest` realizes pending yield and is worth calling before pricing shares.
    pub harvest: bool,
}

/// Lets the vault snapshot a boxed strategy before an operation and put the
/// snapshot back if the operation fails.
pub trait StrategyClone {
    fn clone_box(&self) -> Box<dyn Strategy>;
}

impl<T> StrategyClone for T
where
    T: 'static + Strategy + Clone,
{
    fn clone_box(&self) -> Box<dyn Strategy> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Strategy> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The capability contract between the vault and a yield strategy.
///
/// The vault never assumes that what it sends equals what `total_assets` later
/// reports: a strategy may earn (balance grows) or lose (balance shrinks) on its
/// own.
pub trait Strategy: StrategyClone + Send + Sync + Debug {
    /// The strategy's own account.
    fn address(&self) -> Address;

    /// The underlying asset this strategy accepts.
    fn want(&self) -> Address;

    /// The vault this strategy releases funds to, once bound.
    fn vault(&self) -> Option<Address>;

    /// Binds the strategy to `vault`. Succeeds at most once.
    fn set_vault(&mut self, vault: Address) -> Result<(), StrategyError>;

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::default()
    }

    /// The live balance managed by the strategy, in underlying units.
    fn total_assets(&self, assets: &TokenLedger) -> Result<u128, StrategyError>;

    /// Fails if a deposit of `amount` would be refused. Called before any funds move.
    fn check_deposit(&self, assets: &TokenLedger, amount: u128) -> Result<(), StrategyError> {
        let _ = (assets, amount);
        Ok(())
    }

    /// Puts to work whatever the vault has already transferred to the strategy.
    fn deposit(&mut self, assets: &mut TokenLedger) -> Result<(), StrategyError>;

    /// Puts exactly `amount` of the transferred funds to work.
    fn deposit_exact(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<(), StrategyError> {
        let _ = (assets, amount);
        Err(StrategyError::Unsupported("deposit_exact"))
    }

    /// Releases `amount` back to the bound vault and returns what was released.
    fn withdraw(&mut self, assets: &mut TokenLedger, amount: u128) -> Result<u128, StrategyError>;

    /// Releases everything back to the bound vault and returns what was released.
    fn withdraw_all(&mut self, assets: &mut TokenLedger) -> Result<u128, StrategyError>;

    /// Realizes pending yield. A no-op unless the strategy advertises `harvest`.
    fn harvest(&mut self, assets: &mut TokenLedger) -> Result<(), StrategyError> {
        let _ = assets;
        Ok(())
    }
}

/// Fails unless `assets` is the ledger of the token `strategy` wants.
pub(crate) fn ensure_want(strategy: &dyn Strategy, assets: &TokenLedger) -> Result<(), StrategyError> {
    if assets.token() != strategy.want() {
        return Err(StrategyError::AssetMismatch {
            strategy: strategy.address(),
            expected: strategy.want(),
            found: assets.token(),
        });
    }
    Ok(())
}

/// Binds `slot` to `vault` unless it is already bound.
pub(crate) fn bind_vault(strategy: Address, slot: &mut Option<Address>, vault: Address) -> Result<(), StrategyError> {
    if vault.is_zero() {
        return Err(StrategyError::InvalidParameters("vault must not be the zero address".to_string()));
    }
    if let Some(existing) = slot {
        return Err(StrategyError::VaultAlreadySet { strategy, vault: *existing });
    }
    *slot = Some(vault);
    Ok(())
}
