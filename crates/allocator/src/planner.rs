use crate::error::AllocatorError;
use core_types::{CoreError, MAX_BPS, bps_of};
use vault::{RebalancePlan, StrategyView};

/// Computes the plan that moves every strategy towards its target weight.
///
/// The targets are weights of the deployable capital: everything the vault
/// controls (`idle` plus all live balances) minus an idle reserve of
/// `idle_reserve_bps`. Strategies above target give back the excess, strategies
/// below target receive the shortfall, and moves smaller than `min_move` are
/// skipped. Deposits are funded in table order out of idle plus the planned
/// withdrawals, so the plan is always executable against the same balances.
pub fn compute_plan(
    views: &[StrategyView],
    idle: u128,
    idle_reserve_bps: u16,
    min_move: u128,
) -> Result<RebalancePlan, AllocatorError> {
    if idle_reserve_bps > MAX_BPS {
        return Err(AllocatorError::InvalidParameters(format!(
            "idle_reserve_bps {} exceeds {} bps",
            idle_reserve_bps, MAX_BPS
        )));
    }

    let total = views.iter().try_fold(idle, |acc, view| {
        acc.checked_add(view.live_balance)
            .ok_or_else(|| CoreError::Calculation("total assets overflow u128".to_string()))
    })?;
    let deployable = total - bps_of(total, idle_reserve_bps)?;

    let mut plan = RebalancePlan::noop(views.len());
    for (i, view) in views.iter().enumerate() {
        let target = bps_of(deployable, view.target_weight_bps)?;
        if view.live_balance > target {
            let excess = view.live_balance - target;
            if excess >= min_move.max(1) {
                plan.withdraw_amounts[i] = excess;
            }
        } else {
            let shortfall = target - view.live_balance;
            if shortfall >= min_move.max(1) {
                plan.deposit_amounts[i] = shortfall;
            }
        }
    }

    // Weights summing above 100% would otherwise ask for more than exists.
    let mut budget = idle.saturating_add(plan.total_withdrawals());
    for deposit in plan.deposit_amounts.iter_mut() {
        let funded = (*deposit).min(budget);
        budget -= funded;
        *deposit = funded;
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Address;
    use proptest::prelude::*;

    fn view(id: u64, weight: u16, live: u128) -> StrategyView {
        StrategyView {
            strategy: Address::from_low_u64(id),
            target_weight_bps: weight,
            tracked_balance: live,
            live_balance: live,
        }
    }

    #[test]
    fn moves_excess_from_overweight_to_underweight() {
        let views = [view(0x10, 5_000, 600), view(0x11, 5_000, 0)];
        let plan = compute_plan(&views, 400, 0, 0).unwrap();

        assert_eq!(plan.withdraw_amounts, vec![100, 0]);
        assert_eq!(plan.deposit_amounts, vec![0, 500]);
    }

    #[test]
    fn idle_reserve_is_left_in_the_vault() {
        // total 1000, reserve 10% -> 900 deployable, 450 each.
        let views = [view(0x10, 5_000, 600), view(0x11, 5_000, 0)];
        let plan = compute_plan(&views, 400, 1_000, 0).unwrap();

        assert_eq!(plan.withdraw_amounts, vec![150, 0]);
        assert_eq!(plan.deposit_amounts, vec![0, 450]);
        let idle_after = 400 + plan.total_withdrawals() - plan.total_deposits();
        assert_eq!(idle_after, 100);
    }

    #[test]
    fn small_moves_are_skipped() {
        let views = [view(0x10, 5_000, 505), view(0x11, 5_000, 495)];
        let plan = compute_plan(&views, 0, 0, 10).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn balanced_table_yields_a_noop() {
        let views = [view(0x10, 2_500, 250), view(0x11, 7_500, 750)];
        assert!(compute_plan(&views, 0, 0, 0).unwrap().is_noop());
    }

    #[test]
    fn over_allocated_weights_are_funded_in_table_order() {
        let views = [view(0x10, 8_000, 0), view(0x11, 8_000, 0)];
        let plan = compute_plan(&views, 1_000, 0, 0).unwrap();

        assert_eq!(plan.deposit_amounts, vec![800, 200]);
        assert_eq!(plan.total_withdrawals(), 0);
    }

    #[test]
    fn empty_table_plans_nothing() {
        let plan = compute_plan(&[], 1_000, 0, 0).unwrap();
        assert!(plan.withdraw_amounts.is_empty());
        assert!(plan.deposit_amounts.is_empty());
    }

    #[test]
    fn reserve_above_one_hundred_percent_is_rejected() {
        assert!(matches!(
            compute_plan(&[], 0, 10_001, 0),
            Err(AllocatorError::InvalidParameters(_))
        ));
    }

    proptest! {
        #[test]
        fn plans_are_always_executable(
            table in prop::collection::vec((0u16..=10_000, 0u128..1_000_000_000), 0..6),
            idle in 0u128..1_000_000_000,
            reserve in 0u16..=10_000,
            min_move in 0u128..1_000,
        ) {
            let views: Vec<_> = table
                .iter()
                .enumerate()
                .map(|(i, (weight, live))| view(0x10 + i as u64, *weight, *live))
                .collect();
            let plan = compute_plan(&views, idle, reserve, min_move).unwrap();

            for (i, v) in views.iter().enumerate() {
                prop_assert!(plan.withdraw_amounts[i] <= v.live_balance);
                prop_assert!(plan.withdraw_amounts[i] == 0 || plan.deposit_amounts[i] == 0);
            }
            prop_assert!(plan.total_deposits() <= idle + plan.total_withdrawals());
        }
    }
}
