use crate::error::VaultError;
use chrono::{DateTime, Utc};
use core_types::{Address, StrategySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategies::{Strategy, StrategyCapabilities};

/// One participating strategy and the vault's bookkeeping about it.
#[derive(Debug)]
pub struct StrategyAllocation {
    pub strategy: Box<dyn Strategy>,
    pub target_weight_bps: u16,
    /// Last-synchronized view of the strategy's holdings. A cache; the strategy's
    /// own `total_assets` is authoritative.
    pub tracked_balance: u128,
    /// Read once at registration.
    pub capabilities: StrategyCapabilities,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl StrategyAllocation {
    pub fn new(strategy: Box<dyn Strategy>, target_weight_bps: u16) -> Self {
        let capabilities = strategy.capabilities();
        Self {
            strategy,
            target_weight_bps,
            tracked_balance: 0,
            capabilities,
            last_synced_at: None,
        }
    }

    pub fn address(&self) -> Address {
        self.strategy.address()
    }

    pub fn snapshot(&self) -> StrategySnapshot {
        StrategySnapshot {
            strategy: self.address(),
            target_weight_bps: self.target_weight_bps,
            tracked_balance: self.tracked_balance,
        }
    }
}

/// A monitoring view of one allocation: bookkeeping next to the live balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyView {
    pub strategy: Address,
    pub target_weight_bps: u16,
    pub tracked_balance: u128,
    pub live_balance: u128,
}

/// The ordered registry of participating strategies.
///
/// Entries keep their insertion order until a removal, which moves the last entry
/// into the freed slot.
#[derive(Debug, Default)]
pub struct AllocationTable {
    entries: Vec<StrategyAllocation>,
    index: HashMap<Address, usize>,
}

impl AllocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, strategy: &Address) -> bool {
        self.index.contains_key(strategy)
    }

    pub fn position(&self, strategy: &Address) -> Option<usize> {
        self.index.get(strategy).copied()
    }

    pub fn get(&self, strategy: &Address) -> Option<&StrategyAllocation> {
        let i = self.position(strategy)?;
        Some(&self.entries[i])
    }

    pub fn get_mut(&mut self, strategy: &Address) -> Option<&mut StrategyAllocation> {
        let i = self.position(strategy)?;
        Some(&mut self.entries[i])
    }

    pub fn entries(&self) -> &[StrategyAllocation] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [StrategyAllocation] {
        &mut self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrategyAllocation> {
        self.entries.iter()
    }

    pub fn snapshots(&self) -> Vec<StrategySnapshot> {
        self.entries.iter().map(StrategyAllocation::snapshot).collect()
    }

    pub fn push(&mut self, allocation: StrategyAllocation) -> Result<(), VaultError> {
        let address = allocation.address();
        if self.index.contains_key(&address) {
            return Err(VaultError::DuplicateStrategy(address));
        }
        self.index.insert(address, self.entries.len());
        self.entries.push(allocation);
        Ok(())
    }

    /// Swaps the entry with the last one, pops it, and repoints the moved entry.
    pub fn swap_remove(&mut self, strategy: &Address) -> Result<StrategyAllocation, VaultError> {
        let position = self
            .index
            .remove(strategy)
            .ok_or(VaultError::StrategyNotFound(*strategy))?;
        let removed = self.entries.swap_remove(position);
        if let Some(moved) = self.entries.get(position) {
            self.index.insert(moved.address(), position);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategies::HoldingStrategy;

    fn allocation(id: u64, weight: u16) -> StrategyAllocation {
        let strategy = HoldingStrategy::new(Address::from_low_u64(id), Address::from_low_u64(0xAA)).unwrap();
        StrategyAllocation::new(Box::new(strategy), weight)
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut table = AllocationTable::new();
        table.push(allocation(0x10, 5_000)).unwrap();
        assert!(matches!(
            table.push(allocation(0x10, 1_000)),
            Err(VaultError::DuplicateStrategy(_))
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn swap_remove_repoints_the_moved_entry() {
        let mut table = AllocationTable::new();
        for id in [0x10, 0x11, 0x12] {
            table.push(allocation(id, 1_000)).unwrap();
        }

        let removed = table.swap_remove(&Address::from_low_u64(0x10)).unwrap();
        assert_eq!(removed.address(), Address::from_low_u64(0x10));

        let order: Vec<_> = table.iter().map(StrategyAllocation::address).collect();
        assert_eq!(order, vec![Address::from_low_u64(0x12), Address::from_low_u64(0x11)]);
        assert_eq!(table.position(&Address::from_low_u64(0x12)), Some(0));
        assert_eq!(table.position(&Address::from_low_u64(0x11)), Some(1));
        assert!(!table.contains(&Address::from_low_u64(0x10)));
    }

    #[test]
    fn removing_the_last_entry_leaves_no_stale_index() {
        let mut table = AllocationTable::new();
        table.push(allocation(0x10, 1_000)).unwrap();
        table.push(allocation(0x11, 1_000)).unwrap();
        table.swap_remove(&Address::from_low_u64(0x11)).unwrap();

        assert_eq!(table.position(&Address::from_low_u64(0x10)), Some(0));
        assert!(table.swap_remove(&Address::from_low_u64(0x11)).is_err());
    }

    #[test]
    fn new_entries_start_untracked_with_their_capabilities() {
        let entry = allocation(0x10, 2_500);
        assert_eq!(entry.tracked_balance, 0);
        assert!(entry.last_synced_at.is_none());
        assert_eq!(entry.capabilities, StrategyCapabilities::default());
    }
}
