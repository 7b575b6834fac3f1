//! Dashboard aggregation.

use std::collections::HashMap;

use gridbill_shared::BillingMonth;
use gridbill_shared::types::{effective_rate, round_money};
use rust_decimal::Decimal;

use super::types::{
    DashboardData, DashboardSeries, FocusSnapshot, MonthlyExpenseTotals, MonthlyInvoiceTotals,
};

/// Dashboard business logic.
pub struct DashboardService;

impl DashboardService {
    /// Builds the dashboard payload from per-month rollups.
    ///
    /// Invoice money is converted to display currency by dividing by the
    /// *current* conversion rate — one snapshot rate applied uniformly to
    /// every month in the range, historical ones included (there is no rate
    /// series; known limitation). Expense totals are already display
    /// currency and are never converted.
    ///
    /// The focus month is the requested `focus` when it appears among the
    /// labels, otherwise the last month with data. An empty range yields an
    /// explicit all-empty payload.
    #[must_use]
    pub fn aggregate(
        mut invoices: Vec<MonthlyInvoiceTotals>,
        expenses: Vec<MonthlyExpenseTotals>,
        conversion_rate: Decimal,
        focus: Option<BillingMonth>,
    ) -> DashboardData {
        if invoices.is_empty() {
            return DashboardData::default();
        }

        invoices.sort_by_key(|row| row.month);
        let rate = effective_rate(conversion_rate);

        let expense_by_month: HashMap<BillingMonth, Decimal> = expenses
            .into_iter()
            .map(|row| (row.month, row.total))
            .collect();

        let mut series = DashboardSeries::default();
        for row in &invoices {
            let total = round_money(row.total_due / rate);
            let paid = round_money(row.paid_due / rate);
            let unpaid = (total - paid).max(Decimal::ZERO);
            let avg_invoice = if row.count > 0 {
                round_money(total / Decimal::from(row.count))
            } else {
                Decimal::ZERO
            };
            let spent = expense_by_month
                .get(&row.month)
                .copied()
                .unwrap_or(Decimal::ZERO);

            series.labels.push(row.month.key());
            series.counts.push(row.count);
            series.totals.push(total);
            series.kwh.push(row.kwh);
            series.paid.push(paid);
            series.unpaid.push(unpaid);
            series.avg_invoice.push(avg_invoice);
            series.net.push(total - spent);
        }

        let focus_idx = focus
            .map(|month| month.key())
            .and_then(|key| series.labels.iter().position(|label| *label == key))
            .unwrap_or(series.labels.len() - 1);

        let focus_month = invoices[focus_idx].month;
        let focus = FocusSnapshot {
            month: series.labels[focus_idx].clone(),
            count: series.counts[focus_idx],
            total: series.totals[focus_idx],
            kwh: series.kwh[focus_idx],
            paid: series.paid[focus_idx],
            unpaid: series.unpaid[focus_idx],
            avg_invoice: series.avg_invoice[focus_idx],
            expenses: expense_by_month
                .get(&focus_month)
                .copied()
                .unwrap_or(Decimal::ZERO),
            net_total: series.net[focus_idx],
        };

        DashboardData { series, focus }
    }
}
