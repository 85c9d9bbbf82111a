use crate::error::VaultError;
use crate::vault::Vault;
use configuration::Settings;
use strategies::create_strategy;

/// Builds a vault from validated settings: roles, then every configured strategy
/// in file order, then the multi-strategy flag. All steps run as the owner.
pub fn build_vault(settings: &Settings) -> Result<Vault, VaultError> {
    let vault_settings = &settings.vault;
    let owner = vault_settings.owner;
    let mut vault = Vault::new(vault_settings.address, vault_settings.asset, owner)?;

    if let Some(bot) = vault_settings.allocation_bot {
        vault.set_allocation_bot(owner, bot)?;
    }
    if let Some(manager) = vault_settings.strategy_manager {
        vault.set_strategy_manager(owner, manager)?;
    }
    for strategy_settings in &settings.strategies {
        let strategy = create_strategy(strategy_settings, vault_settings.asset)?;
        vault.add_strategy(owner, strategy, strategy_settings.weight_bps)?;
    }
    if !vault_settings.multi_strategy_enabled {
        vault.set_multi_strategy_enabled(owner, false)?;
    }

    tracing::info!(
        vault = %vault.address(),
        strategies = vault.strategy_count(),
        multi_strategy = vault.multi_strategy_enabled(),
        "Vault built from configuration."
    );
    Ok(vault)
}
