//! The billing calculator.

use gridbill_shared::types::round_money;
use rust_decimal::Decimal;

use super::types::{BillingBreakdown, PricingSnapshot};
use crate::pricing::PriceSchedule;

/// Billing business logic.
pub struct BillingService;

impl BillingService {
    /// Computes the derived financial fields from readings and a pricing
    /// snapshot.
    ///
    /// A current reading below the previous one (meter rollback or
    /// replacement) counts as zero consumption, not an error.
    #[must_use]
    pub fn compute(
        prev_reading: i32,
        curr_reading: i32,
        unit_price: Decimal,
        subscription_fee: Decimal,
    ) -> BillingBreakdown {
        let kwh_used = (curr_reading - prev_reading).max(0);
        let energy_cost = round_money(Decimal::from(kwh_used) * unit_price);
        let month_cost = subscription_fee;
        let total_due = round_money(energy_cost + month_cost);

        BillingBreakdown {
            kwh_used,
            energy_cost,
            month_cost,
            total_due,
        }
    }

    /// Fills unsupplied pricing fields from the current schedule.
    ///
    /// `None` and zero both count as "unset" — the original data entry forms
    /// submit zero for untouched fields. The fee tier is selected by
    /// `subscription_amps`. This fill happens once, at creation/edit time;
    /// the returned snapshot is frozen onto the invoice.
    #[must_use]
    pub fn fill_pricing(
        unit_price: Option<Decimal>,
        subscription_fee: Option<Decimal>,
        subscription_amps: i32,
        schedule: &PriceSchedule,
    ) -> PricingSnapshot {
        let unit_price = match unit_price {
            Some(price) if !price.is_zero() => price,
            _ => schedule.unit_price,
        };
        let subscription_fee = match subscription_fee {
            Some(fee) if !fee.is_zero() => fee,
            _ => schedule.fee_for_amp(subscription_amps),
        };

        PricingSnapshot {
            unit_price,
            subscription_fee,
        }
    }
}
