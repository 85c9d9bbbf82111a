use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction used when an integer conversion does not divide evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    Down,
    Up,
}

/// The two strategy adapter variants the workspace knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Holds the underlying asset directly at the strategy's address.
    Holding,
    /// Forwards the underlying asset into a child share vault.
    Forwarding,
}

/// A privileged role on the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    AllocationBot,
    StrategyManager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::AllocationBot => "allocation bot",
            Role::StrategyManager => "strategy manager",
        };
        f.write_str(name)
    }
}
