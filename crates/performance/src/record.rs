use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The change in one strategy's capital flows reported by a single vault action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceDelta {
    pub value_deposited: u128,
    pub value_withdrawn: u128,
    pub rewards_earned: u128,
    pub amount_slashed: u128,
}

impl PerformanceDelta {
    pub fn deposited(amount: u128) -> Self {
        Self { value_deposited: amount, ..Self::default() }
    }

    pub fn withdrawn(amount: u128) -> Self {
        Self { value_withdrawn: amount, ..Self::default() }
    }

    pub fn rewards(amount: u128) -> Self {
        Self { rewards_earned: amount, ..Self::default() }
    }

    pub fn slashed(amount: u128) -> Self {
        Self { amount_slashed: amount, ..Self::default() }
    }

    /// True when reporting this delta would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Running totals of every delta reported for one strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub total_deposited: u128,
    pub total_withdrawn: u128,
    pub total_rewards: u128,
    pub total_slashed: u128,
    pub updates: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PerformanceRecord {
    /// Folds a delta into the running totals. Totals saturate instead of wrapping.
    pub fn apply(&mut self, delta: &PerformanceDelta) {
        self.total_deposited = self.total_deposited.saturating_add(delta.value_deposited);
        self.total_withdrawn = self.total_withdrawn.saturating_add(delta.value_withdrawn);
        self.total_rewards = self.total_rewards.saturating_add(delta.rewards_earned);
        self.total_slashed = self.total_slashed.saturating_add(delta.amount_slashed);
        self.updates += 1;
        self.last_updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_accumulates_each_component() {
        let mut record = PerformanceRecord::default();
        record.apply(&PerformanceDelta::deposited(1_000));
        record.apply(&PerformanceDelta::rewards(50));
        record.apply(&PerformanceDelta::slashed(20));
        record.apply(&PerformanceDelta::withdrawn(300));

        assert_eq!(record.total_deposited, 1_000);
        assert_eq!(record.total_rewards, 50);
        assert_eq!(record.total_slashed, 20);
        assert_eq!(record.total_withdrawn, 300);
        assert_eq!(record.updates, 4);
        assert!(record.last_updated.is_some());
    }

    #[test]
    fn empty_delta_is_detected() {
        assert!(PerformanceDelta::default().is_empty());
        assert!(!PerformanceDelta::withdrawn(1).is_empty());
    }
}
