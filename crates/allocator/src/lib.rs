//! # Strata Allocator
//!
//! The off-chain allocation bot. It reads the vault's live balances, computes the
//! withdrawals and deposits that bring every strategy back to its target weight,
//! and submits them as a `RebalancePlan`.
//!
//! ## Architectural Principles
//!
//! - **Planning is pure:** `compute_plan` is a function of the strategy views and
//!   the idle balance. It never touches a ledger.
//! - **The vault stays in charge:** The bot holds no special power of its own. The
//!   vault checks the caller's role and the plan's feasibility on execution.
//!
//! ## Public API
//!
//! - `AllocationBot`: Plans and submits rebalances for one vault.
//! - `compute_plan`: The weight-targeting planner.
//! - `AllocatorError`: The specific error types that can be returned from this crate.

pub mod bot;
pub mod error;
pub mod planner;

pub use bot::AllocationBot;
pub use error::AllocatorError;
pub use planner::compute_plan;
