//! Billing data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The derived financial fields of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingBreakdown {
    /// Metered consumption for the period, clamped at zero.
    pub kwh_used: i32,
    /// `kwh_used x unit_price`, rounded to two decimal places.
    pub energy_cost: Decimal,
    /// The flat subscription fee component, independent of usage.
    pub month_cost: Decimal,
    /// `energy_cost + month_cost`, rounded to two decimal places.
    pub total_due: Decimal,
}

/// The pricing snapshot frozen onto an invoice at creation/edit time.
///
/// Later price-schedule changes never touch an existing invoice; this pair
/// is the audit trail for what the customer was actually charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    /// Price per kWh, base currency.
    pub unit_price: Decimal,
    /// Flat monthly subscription fee, base currency.
    pub subscription_fee: Decimal,
}
