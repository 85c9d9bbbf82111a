use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{
    AllocatorSettings, LogFormat, LoggingSettings, Settings, StrategySettings, VaultSettings,
};

/// Prefix of the environment variables that override file values,
/// e.g. `STRATA__VAULT__MULTI_STRATEGY_ENABLED=false`.
pub const ENV_PREFIX: &str = "STRATA";

/// Loads and validates the application configuration from a TOML file.
///
/// This function is the primary entry point for this crate. Values from the file
/// are overridden by `STRATA__*` environment variables before being deserialized
/// into our strongly-typed `Settings` struct.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

/// Parses and validates a configuration held in memory as TOML.
pub fn parse_config(toml: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Address, StrategyKind};

    const SAMPLE: &str = r#"
        [vault]
        address = "0x0000000000000000000000000000000000000001"
        asset = "0x00000000000000000000000000000000000000aa"
        owner = "0x0000000000000000000000000000000000000002"
        allocation_bot = "0x0000000000000000000000000000000000000003"

        [[strategies]]
        address = "0x0000000000000000000000000000000000000010"
        kind = "holding"
        weight_bps = 6000

        [[strategies]]
        address = "0x0000000000000000000000000000000000000011"
        kind = "forwarding"
        weight_bps = 4000
        child_vault = "0x0000000000000000000000000000000000000020"

        [allocator]
        idle_reserve_bps = 500
    "#;

    #[test]
    fn parses_a_complete_document() {
        let settings = parse_config(SAMPLE).unwrap();

        assert_eq!(settings.vault.asset, Address::from_low_u64(0xAA));
        assert!(settings.vault.multi_strategy_enabled);
        assert_eq!(settings.vault.strategy_manager, None);
        assert_eq!(settings.strategies.len(), 2);
        assert_eq!(settings.strategies[1].kind, StrategyKind::Forwarding);
        assert_eq!(settings.allocator.idle_reserve_bps, 500);
        assert_eq!(settings.allocator.min_move, 0);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn rejects_weights_above_one_hundred_percent() {
        let doc = SAMPLE.replace("weight_bps = 6000", "weight_bps = 10001");
        assert!(matches!(parse_config(&doc), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_forwarding_without_child_vault() {
        let doc = SAMPLE.replace(
            "child_vault = \"0x0000000000000000000000000000000000000020\"",
            "",
        );
        assert!(matches!(parse_config(&doc), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_duplicate_strategies() {
        let doc = SAMPLE.replace(
            "0x0000000000000000000000000000000000000011",
            "0x0000000000000000000000000000000000000010",
        );
        assert!(matches!(parse_config(&doc), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_strategies_at_the_vault_or_asset_address() {
        for reserved in ["0x0000000000000000000000000000000000000001", "0x00000000000000000000000000000000000000aa"] {
            let doc = SAMPLE.replace("0x0000000000000000000000000000000000000010", reserved);
            assert!(matches!(parse_config(&doc), Err(ConfigError::ValidationError(_))));
        }
    }

    #[test]
    fn rejects_child_vaults_that_collide_with_other_accounts() {
        let colliding = [
            "0x0000000000000000000000000000000000000001",
            "0x00000000000000000000000000000000000000aa",
            "0x0000000000000000000000000000000000000010",
            "0x0000000000000000000000000000000000000011",
        ];
        for address in colliding {
            let doc = SAMPLE.replace("0x0000000000000000000000000000000000000020", address);
            assert!(matches!(parse_config(&doc), Err(ConfigError::ValidationError(_))), "{}", address);
        }
    }

    #[test]
    fn rejects_a_child_vault_shared_by_two_strategies() {
        let doc = SAMPLE.replace(
            "[allocator]",
            r#"[[strategies]]
        address = "0x0000000000000000000000000000000000000012"
        kind = "forwarding"
        weight_bps = 0
        child_vault = "0x0000000000000000000000000000000000000020"

        [allocator]"#,
        );
        assert!(matches!(parse_config(&doc), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_malformed_addresses() {
        let doc = SAMPLE.replace("0x00000000000000000000000000000000000000aa", "0xnot-an-address");
        assert!(matches!(parse_config(&doc), Err(ConfigError::LoadError(_))));
    }
}
