//! Tests for dashboard aggregation.

use gridbill_shared::BillingMonth;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::DashboardService;
use super::types::{MonthlyExpenseTotals, MonthlyInvoiceTotals};

fn month(key: &str) -> BillingMonth {
    key.parse().unwrap()
}

fn invoice_row(key: &str, count: i64, total: Decimal, kwh: i64, paid: Decimal) -> MonthlyInvoiceTotals {
    MonthlyInvoiceTotals {
        month: month(key),
        count,
        total_due: total,
        kwh,
        paid_due: paid,
    }
}

#[test]
fn test_empty_range_yields_empty_payload() {
    let data = DashboardService::aggregate(vec![], vec![], dec!(90000), None);

    assert!(data.series.labels.is_empty());
    assert!(data.series.totals.is_empty());
    assert_eq!(data.focus.month, "");
    assert_eq!(data.focus.count, 0);
    assert_eq!(data.focus.total, Decimal::ZERO);
    assert_eq!(data.focus.net_total, Decimal::ZERO);
}

#[test]
fn test_uniform_rate_across_months() {
    let rows = vec![
        invoice_row("2025-08", 2, dec!(180000), 100, dec!(90000)),
        invoice_row("2025-09", 1, dec!(90000), 50, dec!(0)),
    ];

    let data = DashboardService::aggregate(rows, vec![], dec!(90000), None);

    assert_eq!(data.series.labels, vec!["2025-08", "2025-09"]);
    // Both months divided by the same current rate.
    assert_eq!(data.series.totals, vec![dec!(2.00), dec!(1.00)]);
    assert_eq!(data.series.paid, vec![dec!(1.00), dec!(0.00)]);
    assert_eq!(data.series.unpaid, vec![dec!(1.00), dec!(1.00)]);
    assert_eq!(data.series.avg_invoice, vec![dec!(1.00), dec!(1.00)]);
    assert_eq!(data.series.kwh, vec![100, 50]);
}

#[test]
fn test_rows_are_ordered_by_month() {
    let rows = vec![
        invoice_row("2025-09", 1, dec!(100), 1, dec!(0)),
        invoice_row("2025-07", 1, dec!(300), 3, dec!(0)),
        invoice_row("2025-08", 1, dec!(200), 2, dec!(0)),
    ];

    let data = DashboardService::aggregate(rows, vec![], dec!(0), None);
    assert_eq!(data.series.labels, vec!["2025-07", "2025-08", "2025-09"]);
    // Zero rate behaves as one.
    assert_eq!(data.series.totals, vec![dec!(300), dec!(200), dec!(100)]);
}

#[test]
fn test_expenses_join_without_conversion() {
    let rows = vec![invoice_row("2025-09", 4, dec!(360000), 240, dec!(360000))];
    let expenses = vec![MonthlyExpenseTotals {
        month: month("2025-09"),
        total: dec!(1.50),
    }];

    let data = DashboardService::aggregate(rows, expenses, dec!(90000), None);

    // Invoice total converted (360000 / 90000 = 4), expenses untouched.
    assert_eq!(data.series.totals, vec![dec!(4.00)]);
    assert_eq!(data.series.net, vec![dec!(2.50)]);
    assert_eq!(data.focus.expenses, dec!(1.50));
    assert_eq!(data.focus.net_total, dec!(2.50));
}

#[test]
fn test_focus_prefers_requested_start_month() {
    let rows = vec![
        invoice_row("2025-08", 2, dec!(200), 20, dec!(100)),
        invoice_row("2025-09", 3, dec!(300), 30, dec!(150)),
    ];

    let data =
        DashboardService::aggregate(rows, vec![], dec!(1), Some(month("2025-08")));
    assert_eq!(data.focus.month, "2025-08");
    assert_eq!(data.focus.count, 2);
}

#[test]
fn test_focus_falls_back_to_last_month_with_data() {
    let rows = vec![
        invoice_row("2025-08", 2, dec!(200), 20, dec!(100)),
        invoice_row("2025-09", 3, dec!(300), 30, dec!(150)),
    ];

    // Requested focus month has no data in the range.
    let data = DashboardService::aggregate(
        rows.clone(),
        vec![],
        dec!(1),
        Some(month("2025-06")),
    );
    assert_eq!(data.focus.month, "2025-09");

    // No requested focus at all.
    let data = DashboardService::aggregate(rows, vec![], dec!(1), None);
    assert_eq!(data.focus.month, "2025-09");
}

#[test]
fn test_unpaid_is_clamped_at_zero() {
    // Paid sum can exceed total after rounding at extreme rates.
    let rows = vec![invoice_row("2025-09", 1, dec!(100), 10, dec!(101))];
    let data = DashboardService::aggregate(rows, vec![], dec!(1), None);
    assert_eq!(data.series.unpaid, vec![dec!(0)]);
}
