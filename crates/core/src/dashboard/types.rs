//! Dashboard data types.

use gridbill_shared::BillingMonth;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One month's invoice rollup, as stored (BASE currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyInvoiceTotals {
    /// The month bucket.
    pub month: BillingMonth,
    /// Number of invoices dated in the month.
    pub count: i64,
    /// Sum of `total_due`.
    pub total_due: Decimal,
    /// Sum of `kwh_used`.
    pub kwh: i64,
    /// Sum of `total_due` over paid invoices only.
    pub paid_due: Decimal,
}

/// One month's expense rollup (already DISPLAY currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyExpenseTotals {
    /// The month bucket.
    pub month: BillingMonth,
    /// Sum of expense cost.
    pub total: Decimal,
}

/// Parallel per-month arrays for charting. Monetary arrays are DISPLAY
/// currency, converted at the single current rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSeries {
    /// Ordered month labels, `"YYYY-MM"`.
    pub labels: Vec<String>,
    /// Invoice counts per month.
    pub counts: Vec<i64>,
    /// Billed totals per month.
    pub totals: Vec<Decimal>,
    /// Consumption per month.
    pub kwh: Vec<i64>,
    /// Collected (paid) totals per month.
    pub paid: Vec<Decimal>,
    /// Outstanding totals per month, clamped at zero.
    pub unpaid: Vec<Decimal>,
    /// Average invoice value per month.
    pub avg_invoice: Vec<Decimal>,
    /// Billed total minus expenses per month.
    pub net: Vec<Decimal>,
}

/// The single month a dashboard highlights in detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSnapshot {
    /// Month label, empty when the range held no data.
    pub month: String,
    /// Invoice count.
    pub count: i64,
    /// Billed total (display currency).
    pub total: Decimal,
    /// Consumption.
    pub kwh: i64,
    /// Collected total.
    pub paid: Decimal,
    /// Outstanding total.
    pub unpaid: Decimal,
    /// Average invoice value.
    pub avg_invoice: Decimal,
    /// Expense total (display currency, never converted).
    pub expenses: Decimal,
    /// `total - expenses`.
    pub net_total: Decimal,
}

/// The full dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    /// Chart series.
    pub series: DashboardSeries,
    /// Focus-month snapshot.
    pub focus: FocusSnapshot,
}
