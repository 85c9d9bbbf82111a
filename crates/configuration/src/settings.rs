use crate::error::ConfigError;
use core_types::{Address, MAX_BPS, StrategyKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub vault: VaultSettings,
    #[serde(default)]
    pub strategies: Vec<StrategySettings>,
    #[serde(default)]
    pub allocator: AllocatorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Identity and roles of the vault itself.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultSettings {
    /// The vault's own account. Idle assets are held here.
    pub address: Address,
    /// The underlying asset accepted for deposits.
    pub asset: Address,
    pub owner: Address,
    pub allocation_bot: Option<Address>,
    pub strategy_manager: Option<Address>,
    #[serde(default = "default_true")]
    pub multi_strategy_enabled: bool,
}

/// One entry of the initial allocation table.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySettings {
    pub address: Address,
    pub kind: StrategyKind,
    pub weight_bps: u16,
    /// The asset the strategy wants. Defaults to the vault asset when omitted.
    pub asset: Option<Address>,
    /// Required for `forwarding` strategies: the child vault receiving the funds.
    pub child_vault: Option<Address>,
}

/// Parameters for the off-chain allocation bot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocatorSettings {
    /// Share of total assets (bps) the bot leaves idle for cheap withdrawals.
    #[serde(default)]
    pub idle_reserve_bps: u16,
    /// Per-strategy moves smaller than this are skipped.
    #[serde(default)]
    pub min_move: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "strata.log".to_string()
}

impl Settings {
    /// Checks the invariants the vault would otherwise reject one call at a time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vault = &self.vault;
        for (name, address) in [("vault.address", vault.address), ("vault.asset", vault.asset), ("vault.owner", vault.owner)] {
            if address.is_zero() {
                return Err(ConfigError::ValidationError(format!("{} must not be the zero address", name)));
            }
        }

        let mut seen = HashSet::new();
        let mut weight_sum: u32 = 0;
        for strategy in &self.strategies {
            if strategy.address.is_zero() {
                return Err(ConfigError::ValidationError(
                    "strategy address must not be the zero address".to_string(),
                ));
            }
            if strategy.address == vault.address || strategy.address == vault.asset {
                return Err(ConfigError::ValidationError(format!(
                    "strategy {} collides with the vault or asset address",
                    strategy.address
                )));
            }
            if !seen.insert(strategy.address) {
                return Err(ConfigError::ValidationError(format!(
                    "strategy {} is listed more than once",
                    strategy.address
                )));
            }
            if strategy.weight_bps > MAX_BPS {
                return Err(ConfigError::ValidationError(format!(
                    "strategy {} weight {} exceeds {} bps",
                    strategy.address, strategy.weight_bps, MAX_BPS
                )));
            }
            if strategy.kind == StrategyKind::Forwarding && strategy.child_vault.is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "forwarding strategy {} needs a child_vault",
                    strategy.address
                )));
            }
            weight_sum += u32::from(strategy.weight_bps);
        }

        // Each child vault holds its own funds, so it must not share an account
        // with the vault, the asset, a strategy or another child.
        let mut children = HashSet::new();
        for child in self.strategies.iter().filter_map(|strategy| strategy.child_vault) {
            if child.is_zero() || child == vault.address || child == vault.asset || seen.contains(&child) {
                return Err(ConfigError::ValidationError(format!(
                    "child_vault {} collides with a zero, vault, asset or strategy address",
                    child
                )));
            }
            if !children.insert(child) {
                return Err(ConfigError::ValidationError(format!(
                    "child_vault {} is shared by more than one strategy",
                    child
                )));
            }
        }

        if weight_sum > u32::from(MAX_BPS) {
            tracing::warn!(weight_sum, "Strategy weights sum above 100%; the planner will over-allocate.");
        }

        if self.allocator.idle_reserve_bps > MAX_BPS {
            return Err(ConfigError::ValidationError(format!(
                "allocator.idle_reserve_bps {} exceeds {} bps",
                self.allocator.idle_reserve_bps, MAX_BPS
            )));
        }
        Ok(())
    }
}
