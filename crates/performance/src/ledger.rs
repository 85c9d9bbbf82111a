use crate::error::PerformanceError;
use crate::record::{PerformanceDelta, PerformanceRecord};
use core_types::Address;
use std::collections::HashMap;
use std::sync::Mutex;

/// The capability the vault reports strategy capital flows to.
///
/// Implementations are shared behind an `Arc`, hence `&self` and the
/// `Send + Sync` bounds.
pub trait PerformanceLedger: Send + Sync {
    /// Folds `delta` into the record kept for `strategy`.
    fn update_strategy(&self, strategy: &Address, delta: &PerformanceDelta) -> Result<(), PerformanceError>;
}

/// Keeps one `PerformanceRecord` per strategy in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPerformanceLedger {
    records: Mutex<HashMap<Address, PerformanceRecord>>,
}

impl InMemoryPerformanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current record for `strategy`, if anything was ever reported.
    pub fn record(&self, strategy: &Address) -> Option<PerformanceRecord> {
        self.records.lock().ok()?.get(strategy).cloned()
    }

    /// Copies of every record, sorted by strategy address.
    pub fn records(&self) -> Vec<(Address, PerformanceRecord)> {
        let Ok(records) = self.records.lock() else {
            return Vec::new();
        };
        let mut all: Vec<_> = records.iter().map(|(k, v)| (*k, v.clone())).collect();
        all.sort_by_key(|(address, _)| *address);
        all
    }
}

impl PerformanceLedger for InMemoryPerformanceLedger {
    fn update_strategy(&self, strategy: &Address, delta: &PerformanceDelta) -> Result<(), PerformanceError> {
        if strategy.is_zero() {
            return Err(PerformanceError::Rejected("zero strategy address".to_string()));
        }
        let mut records = self
            .records
            .lock()
            .map_err(|e| PerformanceError::Unavailable(e.to_string()))?;
        records.entry(*strategy).or_default().apply(delta);
        tracing::debug!(%strategy, ?delta, "Performance record updated.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_kept_per_strategy() {
        let ledger = InMemoryPerformanceLedger::new();
        let a = Address::from_low_u64(0x10);
        let b = Address::from_low_u64(0x11);

        ledger.update_strategy(&a, &PerformanceDelta::deposited(100)).unwrap();
        ledger.update_strategy(&a, &PerformanceDelta::rewards(7)).unwrap();
        ledger.update_strategy(&b, &PerformanceDelta::slashed(3)).unwrap();

        let record_a = ledger.record(&a).unwrap();
        assert_eq!(record_a.total_deposited, 100);
        assert_eq!(record_a.total_rewards, 7);
        assert_eq!(ledger.record(&b).unwrap().total_slashed, 3);
        assert_eq!(ledger.records().len(), 2);
        assert!(ledger.record(&Address::from_low_u64(0x12)).is_none());
    }

    #[test]
    fn zero_strategy_is_rejected() {
        let ledger = InMemoryPerformanceLedger::new();
        let result = ledger.update_strategy(&Address::ZERO, &PerformanceDelta::deposited(1));
        assert!(matches!(result, Err(PerformanceError::Rejected(_))));
    }
}
