//! # Strata Vault
//!
//! This crate is the heart of the workspace: a multi-strategy share vault that
//! accepts a single underlying asset, issues proportional shares, and spreads the
//! deposited capital across a table of yield strategies.
//!
//! ## Architectural Principles
//!
//! - **Explicit state:** A `Vault` owns its share ledger and allocation table. The
//!   underlying asset is a `TokenLedger` injected into every operation that needs it.
//! - **Live balances price shares:** `total_assets` always asks the strategies;
//!   the tracked balances in the table are a cache that is reconciled on sync,
//!   rebalance and liquidation, and every difference is reported as yield or loss.
//! - **Checks before movement:** Every operation validates, then reads, then moves.
//!   Share burns happen only after the full withdrawal amount sits idle in the vault.
//! - **All or nothing:** Deposits, withdrawals, rebalances and emergency withdrawals
//!   run against a checkpoint. If any step fails, the asset ledger, the shares, the
//!   strategies and the event log are put back as they were.
//! - **Best-effort reporting:** The `PerformanceLedger` is told about every committed
//!   capital flow, but its failures are logged and never abort a vault operation.
//!
//! ## Public API
//!
//! - `Vault`: The vault state machine and all of its operations.
//! - `RebalancePlan`: The per-strategy withdraw/deposit amounts a rebalance executes.
//! - `StrategyAllocation` / `StrategyView`: Allocation table entries and their monitoring view.
//! - `Reconciliation`: The tracked-vs-live comparison of a single strategy.
//! - `liquidation_order`: The lowest-balance-first ordering used by withdrawals.
//! - `build_vault`: Constructs a vault from `configuration::Settings`.
//! - `VaultError`: The specific error types that can be returned from this crate.

pub mod accounting;
pub mod admin;
pub mod allocation;
mod checkpoint;
pub mod error;
pub mod liquidation;
mod movement;
pub mod rebalance;
pub mod reconcile;
pub mod roles;
pub mod setup;
pub mod vault;


pub use allocation::{AllocationTable, StrategyAllocation, StrategyView};
pub use error::VaultError;
pub use liquidation::liquidation_order;
pub use rebalance::RebalancePlan;
pub use reconcile::Reconciliation;
pub use roles::Roles;
pub use setup::build_vault;
pub use vault::Vault;
