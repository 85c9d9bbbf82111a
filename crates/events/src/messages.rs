use crate::error::EventsError;
use chrono::{DateTime, Utc};
use core_types::{Address, StrategySnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every state change the vault makes observable.
///
/// The `#[serde(tag = "type", content = "payload")]` attribute serializes each
/// variant into a flat JSON object, e.g.
/// `{ "type": "Deposit", "payload": { "caller": "0x..", "assets": 100, ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum VaultEvent {
    Deposit {
        caller: Address,
        receiver: Address,
        assets: u128,
        shares: u128,
    },
    Withdraw {
        caller: Address,
        receiver: Address,
        owner: Address,
        assets: u128,
        shares: u128,
    },
    StrategyAdded {
        strategy: Address,
        target_weight_bps: u16,
    },
    StrategyRemoved {
        strategy: Address,
    },
    StrategyWeightUpdated {
        strategy: Address,
        old_weight_bps: u16,
        new_weight_bps: u16,
    },
    /// Tracked balance was reconciled against the strategy's live balance.
    StrategyBalanceSynced {
        strategy: Address,
        previous: u128,
        current: u128,
    },
    StrategyDeposited {
        strategy: Address,
        amount: u128,
    },
    StrategyWithdrawn {
        strategy: Address,
        requested: u128,
        received: u128,
    },
    /// Final tracked-balance snapshot of a rebalance.
    Rebalanced {
        allocations: Vec<StrategySnapshot>,
    },
    LegacyStrategyUpdated {
        old: Option<Address>,
        new: Address,
    },
    MultiStrategyToggled {
        enabled: bool,
    },
    AllocationBotUpdated {
        old: Option<Address>,
        new: Address,
    },
    StrategyManagerUpdated {
        old: Option<Address>,
        new: Address,
    },
    Paused {
        caller: Address,
    },
    Unpaused {
        caller: Address,
    },
    EmergencyWithdrawn {
        caller: Address,
        recovered: u128,
    },
    /// The performance ledger rejected an update. The vault operation went ahead.
    PerformanceReportFailed {
        strategy: Address,
        reason: String,
    },
}

/// A single event as recorded by the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: VaultEvent,
}

/// Append-only, in-order record of vault events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps `event` with an id and the current time and appends it.
    pub fn push(&mut self, event: VaultEvent) {
        self.records.push(EventRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Iterates the bare events in emission order.
    pub fn events(&self) -> impl Iterator<Item = &VaultEvent> {
        self.records.iter().map(|record| &record.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Removes and returns every record, leaving the log empty.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Serializes the log as newline-delimited JSON, one record per line.
    pub fn to_json_lines(&self) -> Result<String, EventsError> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_and_payload() {
        let event = VaultEvent::Deposit {
            caller: Address::from_low_u64(1),
            receiver: Address::from_low_u64(2),
            assets: 100,
            shares: 100,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Deposit");
        assert_eq!(json["payload"]["assets"], 100);
        assert_eq!(
            json["payload"]["receiver"],
            "0x0000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn log_keeps_emission_order_and_drains() {
        let mut log = EventLog::new();
        log.push(VaultEvent::MultiStrategyToggled { enabled: true });
        log.push(VaultEvent::Paused { caller: Address::from_low_u64(9) });

        let lines = log.to_json_lines().unwrap();
        assert_eq!(lines.lines().count(), 2);
        assert!(matches!(log.events().next(), Some(VaultEvent::MultiStrategyToggled { enabled: true })));

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn truncate_discards_the_newest_records() {
        let mut log = EventLog::new();
        log.push(VaultEvent::Paused { caller: Address::from_low_u64(9) });
        let mark = log.len();
        log.push(VaultEvent::Unpaused { caller: Address::from_low_u64(9) });
        log.push(VaultEvent::MultiStrategyToggled { enabled: false });

        log.truncate(mark);
        assert_eq!(log.len(), 1);
        assert!(matches!(log.events().last(), Some(VaultEvent::Paused { .. })));

        log.truncate(5);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn records_round_trip_through_json() {
        let mut log = EventLog::new();
        log.push(VaultEvent::Rebalanced {
            allocations: vec![StrategySnapshot {
                strategy: Address::from_low_u64(0x10),
                target_weight_bps: 5_000,
                tracked_balance: 1_000,
            }],
        });
        let line = log.to_json_lines().unwrap();
        let parsed: EventRecord = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(&parsed, &log.records()[0]);
    }
}
