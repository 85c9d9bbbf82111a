use crate::allocation::StrategyAllocation;
use crate::error::VaultError;
use crate::vault::Vault;
use chrono::Utc;
use core_types::Address;
use events::VaultEvent;
use performance::PerformanceDelta;
use serde::{Deserialize, Serialize};
use token::TokenLedger;

/// The outcome of comparing a strategy's tracked balance with its live balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub strategy: Address,
    pub previous: u128,
    pub current: u128,
}

impl Reconciliation {
    /// Yield earned since the last sync.
    pub fn gain(&self) -> u128 {
        self.current.saturating_sub(self.previous)
    }

    /// Loss (slashing) suffered since the last sync.
    pub fn loss(&self) -> u128 {
        self.previous.saturating_sub(self.current)
    }

    pub fn is_unchanged(&self) -> bool {
        self.previous == self.current
    }

    pub fn delta(&self) -> PerformanceDelta {
        PerformanceDelta {
            rewards_earned: self.gain(),
            amount_slashed: self.loss(),
            ..PerformanceDelta::default()
        }
    }
}

/// Sets the entry's tracked balance to `live` and stamps the sync time.
pub(crate) fn reconcile_entry(entry: &mut StrategyAllocation, live: u128) -> Reconciliation {
    let reconciliation = Reconciliation {
        strategy: entry.address(),
        previous: entry.tracked_balance,
        current: live,
    };
    entry.tracked_balance = live;
    entry.last_synced_at = Some(Utc::now());
    reconciliation
}

impl Vault {
    /// Reports a reconciliation's gain or loss and emits the sync event.
    pub(crate) fn record_reconciliation(&mut self, reconciliation: &Reconciliation) {
        if reconciliation.is_unchanged() {
            return;
        }
        let strategy = reconciliation.strategy;
        if reconciliation.loss() > 0 {
            tracing::warn!(%strategy, loss = reconciliation.loss(), "Strategy balance shrank since last sync.");
        } else {
            tracing::debug!(%strategy, gain = reconciliation.gain(), "Strategy earned yield since last sync.");
        }
        self.report_performance(strategy, reconciliation.delta());
        self.emit(VaultEvent::StrategyBalanceSynced {
            strategy,
            previous: reconciliation.previous,
            current: reconciliation.current,
        });
    }

    /// Refreshes every tracked balance from the strategies' live balances.
    ///
    /// Callable by anyone at any time. All live balances are read before anything
    /// is written, so a failing strategy leaves the bookkeeping untouched. The legacy
    /// strategy, if one is installed, is synced after the table.
    pub fn sync_strategy_balances(&mut self, assets: &TokenLedger) -> Result<Vec<Reconciliation>, VaultError> {
        self.ensure_asset_ledger(assets)?;
        let live = self.live_balances(assets)?;
        let legacy_live = match &self.legacy {
            Some(entry) => Some(entry.strategy.total_assets(assets)?),
            None => None,
        };

        let mut reconciliations = Vec::with_capacity(live.len() + 1);
        for (i, balance) in live.into_iter().enumerate() {
            let reconciliation = reconcile_entry(&mut self.allocations.entries_mut()[i], balance);
            self.record_reconciliation(&reconciliation);
            reconciliations.push(reconciliation);
        }
        if let (Some(entry), Some(balance)) = (self.legacy.as_mut(), legacy_live) {
            let reconciliation = reconcile_entry(entry, balance);
            self.record_reconciliation(&reconciliation);
            reconciliations.push(reconciliation);
        }

        self.flush_reports();
        tracing::debug!(strategies = reconciliations.len(), "Strategy balances synced.");
        Ok(reconciliations)
    }

    /// The live balance of every table entry, in table order.
    pub(crate) fn live_balances(&self, assets: &TokenLedger) -> Result<Vec<u128>, VaultError> {
        self.allocations
            .iter()
            .map(|entry| entry.strategy.total_assets(assets).map_err(VaultError::from))
            .collect()
    }
}
