use crate::error::StrategyError;
use crate::{ChildVault, ForwardingStrategy, HoldingStrategy, Strategy};
use configuration::StrategySettings;
use core_types::{Address, StrategyKind};

/// Creates a new strategy instance from its configuration entry.
///
/// `vault_asset` fills in the wanted asset when the entry leaves it out. The returned
/// strategy is not yet bound to a vault; registration on the vault does that.
pub fn create_strategy(
    settings: &StrategySettings,
    vault_asset: Address,
) -> Result<Box<dyn Strategy>, StrategyError> {
    let want = settings.asset.unwrap_or(vault_asset);
    // The compiler will error here if a new StrategyKind is added but not handled.
    match settings.kind {
        StrategyKind::Holding => Ok(Box::new(HoldingStrategy::new(settings.address, want)?)),
        StrategyKind::Forwarding => {
            let child_address = settings.child_vault.ok_or_else(|| {
                StrategyError::InvalidParameters(format!(
                    "forwarding strategy {} requires a `child_vault` in config.",
                    settings.address
                ))
            })?;
            let child = ChildVault::new(child_address)?;
            Ok(Box::new(ForwardingStrategy::new(settings.address, want, child)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: StrategyKind, child_vault: Option<Address>) -> StrategySettings {
        StrategySettings {
            address: Address::from_low_u64(0x10),
            kind,
            weight_bps: 5_000,
            asset: None,
            child_vault,
        }
    }

    #[test]
    fn builds_each_kind_with_the_vault_asset_as_default() {
        let asset = Address::from_low_u64(0xAA);
        let holding = create_strategy(&settings(StrategyKind::Holding, None), asset).unwrap();
        assert_eq!(holding.want(), asset);
        assert!(!holding.capabilities().exact_deposit);

        let forwarding =
            create_strategy(&settings(StrategyKind::Forwarding, Some(Address::from_low_u64(0x20))), asset).unwrap();
        assert!(forwarding.capabilities().exact_deposit);
        assert!(forwarding.vault().is_none());
    }

    #[test]
    fn explicit_asset_overrides_the_default() {
        let mut entry = settings(StrategyKind::Holding, None);
        entry.asset = Some(Address::from_low_u64(0xBB));
        let strategy = create_strategy(&entry, Address::from_low_u64(0xAA)).unwrap();
        assert_eq!(strategy.want(), Address::from_low_u64(0xBB));
    }

    #[test]
    fn forwarding_without_child_is_rejected() {
        let result = create_strategy(&settings(StrategyKind::Forwarding, None), Address::from_low_u64(0xAA));
        assert!(matches!(result, Err(StrategyError::InvalidParameters(_))));
    }
}
