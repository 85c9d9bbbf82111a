//! # Strata Core Types
//!
//! Layer 0 crate shared by every other member of the workspace. It owns the
//! identifiers, enums and integer math the vault is built on and depends on
//! no other local crate.

pub mod enums;
pub mod error;
pub mod math;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Role, Rounding, StrategyKind};
pub use error::CoreError;
pub use math::{MAX_BPS, bps_of, mul_div, ratio};
pub use structs::{Address, StrategySnapshot};
