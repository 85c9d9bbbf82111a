//! # Strata Performance Ledger
//!
//! This crate defines the capability the vault reports strategy capital flows to,
//! and a simple in-memory implementation of it.
//!
//! ## Architectural Principles
//!
//! - **Fire-and-forget sink:** The vault computes per-strategy deltas and hands
//!   them to a `PerformanceLedger`. A ledger failure is the ledger's problem; the
//!   vault logs it and carries on.
//! - **Accumulate, don't snapshot:** A `PerformanceRecord` is the running total
//!   of every delta ever reported for one strategy.
//!
//! ## Public API
//!
//! - `PerformanceLedger`: The capability trait the vault writes to.
//! - `InMemoryPerformanceLedger`: A thread-safe, in-process implementation.
//! - `PerformanceDelta` / `PerformanceRecord`: One report and the running totals.
//! - `PerformanceReport`: Derived net-yield figures for a single strategy.
//! - `PerformanceError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod ledger;
pub mod record;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use error::PerformanceError;
pub use ledger::{InMemoryPerformanceLedger, PerformanceLedger};
pub use record::{PerformanceDelta, PerformanceRecord};
pub use report::PerformanceReport;
