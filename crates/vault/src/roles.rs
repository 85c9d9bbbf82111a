use crate::error::VaultError;
use core_types::{Address, Role};

/// The privileged accounts of a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles {
    pub owner: Address,
    pub allocation_bot: Option<Address>,
    pub strategy_manager: Option<Address>,
}

impl Roles {
    pub fn new(owner: Address) -> Self {
        Self { owner, allocation_bot: None, strategy_manager: None }
    }

    pub fn require_owner(&self, caller: Address) -> Result<(), VaultError> {
        if caller == self.owner {
            return Ok(());
        }
        Err(VaultError::NotAuthorized { caller, role: Role::Owner })
    }

    /// The owner doubles as a strategy manager.
    pub fn require_strategy_manager(&self, caller: Address) -> Result<(), VaultError> {
        if caller == self.owner || Some(caller) == self.strategy_manager {
            return Ok(());
        }
        Err(VaultError::NotAuthorized { caller, role: Role::StrategyManager })
    }

    /// The owner can always rebalance as the emergency operator.
    pub fn require_allocation_bot(&self, caller: Address) -> Result<(), VaultError> {
        if caller == self.owner || Some(caller) == self.allocation_bot {
            return Ok(());
        }
        Err(VaultError::NotAuthorized { caller, role: Role::AllocationBot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes_every_check() {
        let owner = Address::from_low_u64(1);
        let roles = Roles::new(owner);
        assert!(roles.require_owner(owner).is_ok());
        assert!(roles.require_strategy_manager(owner).is_ok());
        assert!(roles.require_allocation_bot(owner).is_ok());
    }

    #[test]
    fn delegated_roles_do_not_leak() {
        let bot = Address::from_low_u64(3);
        let manager = Address::from_low_u64(4);
        let roles = Roles {
            owner: Address::from_low_u64(1),
            allocation_bot: Some(bot),
            strategy_manager: Some(manager),
        };

        assert!(roles.require_allocation_bot(bot).is_ok());
        assert!(roles.require_strategy_manager(bot).is_err());
        assert!(roles.require_strategy_manager(manager).is_ok());
        assert!(matches!(
            roles.require_owner(manager),
            Err(VaultError::NotAuthorized { role: Role::Owner, .. })
        ));
    }
}
