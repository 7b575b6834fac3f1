//! Property-based tests for the billing calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use gridbill_shared::CurrencyUnit;
use gridbill_shared::types::round_money;

use super::service::BillingService;
use crate::pricing::PriceSchedule;

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    /// The three derivation identities hold for every invoice:
    /// `kwh_used == max(0, curr - prev)`,
    /// `energy_cost == round(kwh_used * unit_price, 2)`,
    /// `total_due == round(energy_cost + month_cost, 2)`.
    #[test]
    fn prop_derivation_identities(
        prev in 0i32..10_000_000,
        curr in 0i32..10_000_000,
        unit_price in price_strategy(),
        fee in price_strategy(),
    ) {
        let bill = BillingService::compute(prev, curr, unit_price, fee);

        prop_assert_eq!(bill.kwh_used, (curr - prev).max(0));
        prop_assert_eq!(
            bill.energy_cost,
            round_money(Decimal::from(bill.kwh_used) * unit_price)
        );
        prop_assert_eq!(bill.month_cost, fee);
        prop_assert_eq!(bill.total_due, round_money(bill.energy_cost + bill.month_cost));
    }

    /// Meter rollback is zero consumption: only the flat fee is owed.
    #[test]
    fn prop_rollback_bills_fee_only(
        prev in 1i32..10_000_000,
        below in 0i32..1_000_000,
        unit_price in price_strategy(),
        fee in price_strategy(),
    ) {
        let curr = prev.saturating_sub(below.min(prev));
        let bill = BillingService::compute(prev, curr, unit_price, fee);

        prop_assert_eq!(bill.kwh_used, 0);
        prop_assert_eq!(bill.energy_cost, Decimal::ZERO);
        prop_assert_eq!(bill.total_due, round_money(fee));
    }

    /// The calculator is deterministic, so recomputing with the same
    /// inputs (the bulk-reprice path) cannot change the totals.
    #[test]
    fn prop_recompute_is_idempotent(
        prev in 0i32..10_000_000,
        curr in 0i32..10_000_000,
        unit_price in price_strategy(),
        fee in price_strategy(),
    ) {
        let once = BillingService::compute(prev, curr, unit_price, fee);
        let again = BillingService::compute(prev, curr, unit_price, fee);
        prop_assert_eq!(once, again);
        // month_cost is the fee itself, untouched by recomputation.
        prop_assert_eq!(once.month_cost, fee);
    }
}

mod unit_tests {
    use super::*;

    fn schedule() -> PriceSchedule {
        PriceSchedule {
            unit_price: dec!(1500),
            fee_5: dec!(5000),
            fee_10: dec!(10000),
            fee_15: dec!(15000),
            fee_20: dec!(20000),
            unit: CurrencyUnit::Base,
            conversion_rate: dec!(90000),
        }
    }

    #[test]
    fn test_quick_create_scenario() {
        // Branch 101: last reading 3200, new reading 3500, unit price 1500,
        // subscription fee 20000.
        let bill = BillingService::compute(3200, 3500, dec!(1500), dec!(20000));

        assert_eq!(bill.kwh_used, 300);
        assert_eq!(bill.energy_cost, dec!(450000));
        assert_eq!(bill.month_cost, dec!(20000));
        assert_eq!(bill.total_due, dec!(470000));
    }

    #[test]
    fn test_fractional_unit_price_rounds_to_cents() {
        let bill = BillingService::compute(0, 3, dec!(0.125), dec!(0));
        assert_eq!(bill.energy_cost, dec!(0.38));
        assert_eq!(bill.total_due, dec!(0.38));
    }

    #[test]
    fn test_fill_pricing_none_pulls_defaults() {
        let snapshot = BillingService::fill_pricing(None, None, 10, &schedule());
        assert_eq!(snapshot.unit_price, dec!(1500));
        assert_eq!(snapshot.subscription_fee, dec!(10000));
    }

    #[test]
    fn test_fill_pricing_zero_counts_as_unset() {
        let snapshot =
            BillingService::fill_pricing(Some(dec!(0)), Some(dec!(0)), 20, &schedule());
        assert_eq!(snapshot.unit_price, dec!(1500));
        assert_eq!(snapshot.subscription_fee, dec!(20000));
    }

    #[test]
    fn test_fill_pricing_keeps_supplied_values() {
        let snapshot =
            BillingService::fill_pricing(Some(dec!(1800)), Some(dec!(7500)), 20, &schedule());
        assert_eq!(snapshot.unit_price, dec!(1800));
        assert_eq!(snapshot.subscription_fee, dec!(7500));
    }

    #[test]
    fn test_fill_pricing_unknown_tier_gets_zero_fee() {
        let snapshot = BillingService::fill_pricing(None, None, 7, &schedule());
        assert_eq!(snapshot.subscription_fee, dec!(0));
    }
}
