use crate::allocation::{AllocationTable, StrategyAllocation, StrategyView};
use crate::error::VaultError;
use crate::roles::Roles;
use core_types::Address;
use events::{EventLog, VaultEvent};
use performance::{PerformanceDelta, PerformanceLedger};
use std::sync::Arc;
use strategies::Strategy;
use token::TokenLedger;

/// A multi-strategy share vault over a single underlying asset.
///
/// The vault owns its share ledger and allocation table. The underlying asset is
/// not owned: every operation that needs it takes the asset `TokenLedger` as an
/// argument, and the vault's idle balance is simply its own balance there.
///
/// Every public mutation takes `&mut self`, so no strategy call can re-enter the
/// vault while an operation is in flight.
pub struct Vault {
    pub(crate) address: Address,
    pub(crate) asset: Address,
    pub(crate) shares: TokenLedger,
    pub(crate) roles: Roles,
    pub(crate) paused: bool,
    pub(crate) multi_strategy_enabled: bool,
    pub(crate) allocations: AllocationTable,
    /// Used only while multi-strategy mode is off.
    pub(crate) legacy: Option<StrategyAllocation>,
    pub(crate) performance_ledger: Option<Arc<dyn PerformanceLedger>>,
    /// Reports held back until the running operation commits.
    pub(crate) pending_reports: Vec<(Address, PerformanceDelta)>,
    pub(crate) events: EventLog,
}

impl Vault {
    /// Creates an empty, unpaused vault in multi-strategy mode.
    pub fn new(address: Address, asset: Address, owner: Address) -> Result<Self, VaultError> {
        if address.is_zero() {
            return Err(VaultError::ZeroAddress("vault"));
        }
        if asset.is_zero() {
            return Err(VaultError::ZeroAddress("asset"));
        }
        if owner.is_zero() {
            return Err(VaultError::ZeroAddress("owner"));
        }
        if address == asset {
            return Err(VaultError::AssetMismatch { expected: asset, found: address });
        }

        tracing::info!(vault = %address, %asset, %owner, "Vault created.");
        Ok(Self {
            address,
            asset,
            shares: TokenLedger::new(address),
            roles: Roles::new(owner),
            paused: false,
            multi_strategy_enabled: true,
            allocations: AllocationTable::new(),
            legacy: None,
            performance_ledger: None,
            pending_reports: Vec::new(),
            events: EventLog::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn multi_strategy_enabled(&self) -> bool {
        self.multi_strategy_enabled
    }

    pub fn strategies(&self) -> &[StrategyAllocation] {
        self.allocations.entries()
    }

    pub fn strategy_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn allocation(&self, strategy: &Address) -> Option<&StrategyAllocation> {
        self.allocations.get(strategy)
    }

    pub fn legacy_strategy(&self) -> Option<&StrategyAllocation> {
        self.legacy.as_ref()
    }

    pub fn has_performance_ledger(&self) -> bool {
        self.performance_ledger.is_some()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Underlying held directly by the vault, not deployed to any strategy.
    pub fn idle_balance(&self, assets: &TokenLedger) -> u128 {
        assets.balance_of(&self.address)
    }

    /// Tracked next to live balance for every strategy in the table.
    pub fn strategy_views(&self, assets: &TokenLedger) -> Result<Vec<StrategyView>, VaultError> {
        self.ensure_asset_ledger(assets)?;
        self.allocations
            .iter()
            .map(|entry| -> Result<StrategyView, VaultError> {
                Ok(StrategyView {
                    strategy: entry.address(),
                    target_weight_bps: entry.target_weight_bps,
                    tracked_balance: entry.tracked_balance,
                    live_balance: entry.strategy.total_assets(assets)?,
                })
            })
            .collect()
    }

    pub(crate) fn ensure_asset_ledger(&self, assets: &TokenLedger) -> Result<(), VaultError> {
        if assets.token() != self.asset {
            return Err(VaultError::AssetMismatch { expected: self.asset, found: assets.token() });
        }
        Ok(())
    }

    /// Checks that `strategy` wants the vault asset and is bound (or bindable) to
    /// this vault, binding it if it is still unbound.
    pub(crate) fn adopt_strategy(&self, strategy: &mut dyn Strategy) -> Result<(), VaultError> {
        if strategy.address().is_zero() {
            return Err(VaultError::ZeroAddress("strategy"));
        }
        if strategy.address() == self.address || strategy.address() == self.asset {
            return Err(VaultError::ReservedStrategyAddress(strategy.address()));
        }
        if strategy.want() != self.asset {
            return Err(VaultError::AssetMismatch { expected: self.asset, found: strategy.want() });
        }
        match strategy.vault() {
            Some(vault) if vault != self.address => Err(VaultError::StrategyVaultMismatch {
                strategy: strategy.address(),
                vault,
            }),
            Some(_) => Ok(()),
            None => Ok(strategy.set_vault(self.address)?),
        }
    }

    pub(crate) fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    /// Queues `delta` for the performance ledger, if one is set. Queued reports are
    /// delivered by `flush_reports` once the operation producing them has succeeded.
    pub(crate) fn report_performance(&mut self, strategy: Address, delta: PerformanceDelta) {
        if delta.is_empty() || self.performance_ledger.is_none() {
            return;
        }
        self.pending_reports.push((strategy, delta));
    }

    /// Hands every queued report to the performance ledger.
    ///
    /// A ledger failure is logged and recorded as an event but never returned.
    pub(crate) fn flush_reports(&mut self) {
        let reports = std::mem::take(&mut self.pending_reports);
        let Some(ledger) = self.performance_ledger.clone() else {
            return;
        };
        for (strategy, delta) in reports {
            if let Err(e) = ledger.update_strategy(&strategy, &delta) {
                tracing::warn!(%strategy, error = %e, "Performance ledger update failed; continuing.");
                self.emit(VaultEvent::PerformanceReportFailed { strategy, reason: e.to_string() });
            }
        }
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("address", &self.address)
            .field("asset", &self.asset)
            .field("total_supply", &self.shares.total_supply())
            .field("paused", &self.paused)
            .field("multi_strategy_enabled", &self.multi_strategy_enabled)
            .field("strategies", &self.allocations.len())
            .field("legacy", &self.legacy.as_ref().map(StrategyAllocation::address))
            .field("performance_ledger", &self.performance_ledger.is_some())
            .finish()
    }
}
