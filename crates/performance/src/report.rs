use crate::error::PerformanceError;
use crate::record::PerformanceRecord;
use core_types::{Address, ratio};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Net-yield figures derived from a strategy's `PerformanceRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub strategy: Address,
    pub total_deposited: u128,
    pub total_withdrawn: u128,
    /// Rewards earned minus amount slashed. Negative when losses dominate.
    pub net_yield: i128,
    /// `net_yield / total_deposited` in percent. None before any deposit.
    pub yield_pct: Option<Decimal>,
}

impl PerformanceReport {
    pub fn from_record(strategy: Address, record: &PerformanceRecord) -> Result<Self, PerformanceError> {
        let as_signed = |value: u128| {
            i128::try_from(value)
                .map_err(|_| PerformanceError::Calculation(format!("{} does not fit into i128", value)))
        };
        let net_yield = as_signed(record.total_rewards)? - as_signed(record.total_slashed)?;

        let yield_pct = if record.total_deposited == 0 {
            None
        } else {
            let magnitude = ratio(net_yield.unsigned_abs(), record.total_deposited)
                .map_err(|e| PerformanceError::Calculation(e.to_string()))?
                * Decimal::ONE_HUNDRED;
            Some(if net_yield < 0 { -magnitude } else { magnitude })
        };

        Ok(Self {
            strategy,
            total_deposited: record.total_deposited,
            total_withdrawn: record.total_withdrawn,
            net_yield,
            yield_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PerformanceDelta;
    use rust_decimal_macros::dec;

    #[test]
    fn report_nets_rewards_against_slashing() {
        let mut record = PerformanceRecord::default();
        record.apply(&PerformanceDelta::deposited(1_000));
        record.apply(&PerformanceDelta::rewards(80));
        record.apply(&PerformanceDelta::slashed(30));

        let report = PerformanceReport::from_record(Address::from_low_u64(1), &record).unwrap();
        assert_eq!(report.net_yield, 50);
        assert_eq!(report.yield_pct, Some(dec!(5)));
    }

    #[test]
    fn losses_produce_negative_yield() {
        let mut record = PerformanceRecord::default();
        record.apply(&PerformanceDelta::deposited(200));
        record.apply(&PerformanceDelta::slashed(50));

        let report = PerformanceReport::from_record(Address::from_low_u64(1), &record).unwrap();
        assert_eq!(report.net_yield, -50);
        assert_eq!(report.yield_pct, Some(dec!(-25)));
    }

    #[test]
    fn no_deposit_means_no_percentage() {
        let report = PerformanceReport::from_record(Address::from_low_u64(1), &PerformanceRecord::default()).unwrap();
        assert_eq!(report.yield_pct, None);
    }
}
