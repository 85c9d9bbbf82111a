//! All-or-nothing execution for the operations that move capital.
//!
//! A checkpoint copies every piece of state such an operation can touch: the
//! asset ledger, the share ledger, each strategy with its bookkeeping, and the
//! length of the event log. Performance reports are queued while the operation
//! runs and only reach the ledger once it has succeeded.

use crate::allocation::StrategyAllocation;
use crate::error::VaultError;
use crate::vault::Vault;
use chrono::{DateTime, Utc};
use strategies::Strategy;
use token::TokenLedger;

#[derive(Debug)]
struct SavedEntry {
    strategy: Box<dyn Strategy>,
    tracked_balance: u128,
    last_synced_at: Option<DateTime<Utc>>,
}

impl SavedEntry {
    fn capture(entry: &StrategyAllocation) -> Self {
        Self {
            strategy: entry.strategy.clone(),
            tracked_balance: entry.tracked_balance,
            last_synced_at: entry.last_synced_at,
        }
    }

    fn restore(self, entry: &mut StrategyAllocation) {
        entry.strategy = self.strategy;
        entry.tracked_balance = self.tracked_balance;
        entry.last_synced_at = self.last_synced_at;
    }
}

#[derive(Debug)]
struct Checkpoint {
    assets: TokenLedger,
    shares: TokenLedger,
    entries: Vec<SavedEntry>,
    legacy: Option<SavedEntry>,
    events: usize,
}

impl Checkpoint {
    fn capture(vault: &Vault, assets: &TokenLedger) -> Self {
        Self {
            assets: assets.clone(),
            shares: vault.shares.clone(),
            entries: vault.allocations.iter().map(SavedEntry::capture).collect(),
            legacy: vault.legacy.as_ref().map(SavedEntry::capture),
            events: vault.events.len(),
        }
    }

    /// Puts everything back. The table itself is never resized inside a guarded
    /// operation, so saved entries line up with live ones by position.
    fn restore(self, vault: &mut Vault, assets: &mut TokenLedger) {
        *assets = self.assets;
        vault.shares = self.shares;
        for (entry, saved) in vault.allocations.entries_mut().iter_mut().zip(self.entries) {
            saved.restore(entry);
        }
        if let (Some(entry), Some(saved)) = (vault.legacy.as_mut(), self.legacy) {
            saved.restore(entry);
        }
        vault.events.truncate(self.events);
    }
}

impl Vault {
    /// Runs `operation` so that it either completes or leaves no trace.
    ///
    /// On success the queued performance reports are delivered. On failure they are
    /// dropped and the vault, its strategies and `assets` are restored to the state
    /// they had before the call.
    pub(crate) fn atomically<T>(
        &mut self,
        assets: &mut TokenLedger,
        operation: impl FnOnce(&mut Vault, &mut TokenLedger) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let checkpoint = Checkpoint::capture(self, assets);
        match operation(self, assets) {
            Ok(value) => {
                self.flush_reports();
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(vault = %self.address, error = %e, "Operation failed; state rolled back.");
                self.pending_reports.clear();
                checkpoint.restore(self, assets);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Address;
    use events::VaultEvent;
    use strategies::HoldingStrategy;

    fn setup() -> (Vault, TokenLedger) {
        let asset = Address::from_low_u64(0xAA);
        let mut vault = Vault::new(Address::from_low_u64(1), asset, Address::from_low_u64(2)).unwrap();
        let strategy = HoldingStrategy::new(Address::from_low_u64(0x10), asset).unwrap();
        vault.add_strategy(Address::from_low_u64(2), Box::new(strategy), 10_000).unwrap();
        let mut assets = TokenLedger::new(asset);
        assets.mint(&vault.address(), 500).unwrap();
        (vault, assets)
    }

    #[test]
    fn failure_restores_ledgers_bookkeeping_and_events() {
        let (mut vault, mut assets) = setup();
        let events_before = vault.events().len();

        let result: Result<(), VaultError> = vault.atomically(&mut assets, |vault, assets| {
            let strategy = Address::from_low_u64(0x10);
            assets.transfer(&vault.address, &strategy, 200)?;
            vault.shares.mint(&Address::from_low_u64(0xA1), 50)?;
            vault.allocations.entries_mut()[0].tracked_balance = 200;
            vault.emit(VaultEvent::StrategyDeposited { strategy, amount: 200 });
            Err(VaultError::ZeroAmount)
        });

        assert!(matches!(result, Err(VaultError::ZeroAmount)));
        assert_eq!(vault.idle_balance(&assets), 500);
        assert_eq!(assets.balance_of(&Address::from_low_u64(0x10)), 0);
        assert_eq!(vault.total_supply(), 0);
        assert_eq!(vault.strategies()[0].tracked_balance, 0);
        assert_eq!(vault.events().len(), events_before);
    }

    #[test]
    fn success_keeps_every_change() {
        let (mut vault, mut assets) = setup();

        let moved = vault
            .atomically(&mut assets, |vault, assets| {
                assets.transfer(&vault.address, &Address::from_low_u64(0x10), 200)?;
                vault.allocations.entries_mut()[0].tracked_balance = 200;
                Ok(200u128)
            })
            .unwrap();

        assert_eq!(moved, 200);
        assert_eq!(vault.idle_balance(&assets), 300);
        assert_eq!(vault.strategies()[0].tracked_balance, 200);
    }
}
