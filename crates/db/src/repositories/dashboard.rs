//! Dashboard repository: range queries feeding the pure aggregator.
//!
//! Fetches invoices and expenses over the requested month range, folds
//! them into per-month rollups, and hands the rollups plus the current
//! conversion rate to `gridbill_core::dashboard`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use gridbill_core::dashboard::{
    DashboardData, DashboardService, MonthlyExpenseTotals, MonthlyInvoiceTotals,
};
use gridbill_shared::BillingMonth;

use super::pricing::{PricingError, PricingRepository};
use crate::entities::{expenses, invoices};

/// Error types for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Pricing read failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
    pricing: PricingRepository,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            pricing: PricingRepository::new(db.clone()),
            db,
        }
    }

    /// Builds the dashboard payload for an inclusive month range.
    ///
    /// With neither end given, the range is the current calendar month.
    /// The requested start month doubles as the focus month when it holds
    /// data.
    pub async fn dashboard(
        &self,
        start: Option<BillingMonth>,
        end: Option<BillingMonth>,
    ) -> Result<DashboardData, DashboardError> {
        let (lower, upper) = range_bounds(start, end, Utc::now().date_naive());

        let mut invoice_query = invoices::Entity::find();
        if let Some(lower) = lower {
            invoice_query = invoice_query.filter(invoices::Column::Date.gte(lower));
        }
        if let Some(upper) = upper {
            invoice_query = invoice_query.filter(invoices::Column::Date.lt(upper));
        }
        let invoice_rows = rollup_invoices(&invoice_query.all(&self.db).await?);

        let mut expense_query = expenses::Entity::find();
        if let Some(lower) = lower {
            expense_query = expense_query.filter(expenses::Column::Date.gte(lower));
        }
        if let Some(upper) = upper {
            expense_query = expense_query.filter(expenses::Column::Date.lt(upper));
        }
        let expense_rows = rollup_expenses(&expense_query.all(&self.db).await?);

        let schedule = self.pricing.get().await?;

        Ok(DashboardService::aggregate(
            invoice_rows,
            expense_rows,
            schedule.conversion_rate,
            start,
        ))
    }
}

/// Resolves the inclusive month range into half-open date bounds. Neither
/// end given means the current month; a single end leaves the other side
/// unbounded.
fn range_bounds(
    start: Option<BillingMonth>,
    end: Option<BillingMonth>,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match (start, end) {
        (None, None) => {
            let (first, next_first) = BillingMonth::from_date(today).bounds();
            (Some(first), Some(next_first))
        }
        (start, end) => (
            start.map(BillingMonth::first_day),
            end.map(|month| month.next().first_day()),
        ),
    }
}

/// Folds invoice rows into per-month rollups.
fn rollup_invoices(rows: &[invoices::Model]) -> Vec<MonthlyInvoiceTotals> {
    let mut buckets: BTreeMap<BillingMonth, MonthlyInvoiceTotals> = BTreeMap::new();

    for row in rows {
        let month = BillingMonth::from_date(row.date);
        let bucket = buckets.entry(month).or_insert(MonthlyInvoiceTotals {
            month,
            count: 0,
            total_due: Decimal::ZERO,
            kwh: 0,
            paid_due: Decimal::ZERO,
        });
        bucket.count += 1;
        bucket.total_due += row.total_due;
        bucket.kwh += i64::from(row.kwh_used);
        if row.is_paid {
            bucket.paid_due += row.total_due;
        }
    }

    buckets.into_values().collect()
}

/// Folds expense rows into per-month rollups.
fn rollup_expenses(rows: &[expenses::Model]) -> Vec<MonthlyExpenseTotals> {
    let mut buckets: BTreeMap<BillingMonth, Decimal> = BTreeMap::new();

    for row in rows {
        *buckets
            .entry(BillingMonth::from_date(row.date))
            .or_insert(Decimal::ZERO) += row.cost;
    }

    buckets
        .into_iter()
        .map(|(month, total)| MonthlyExpenseTotals { month, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::ExpenseKind;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(d: NaiveDate, total: Decimal, kwh: i32, paid: bool) -> invoices::Model {
        invoices::Model {
            id: Uuid::new_v4(),
            invoice_number: String::new(),
            date: d,
            customer_name: String::new(),
            meter_number: None,
            branch_number: "101".to_string(),
            subscription_amps: 10,
            prev_reading: 0,
            curr_reading: kwh,
            unit_price: Decimal::ZERO,
            subscription_fee: Decimal::ZERO,
            kwh_used: kwh,
            energy_cost: Decimal::ZERO,
            month_cost: Decimal::ZERO,
            total_due: total,
            is_paid: paid,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_rollup_invoices_groups_by_month() {
        let rows = vec![
            invoice(date(2025, 9, 1), dec!(100), 10, true),
            invoice(date(2025, 9, 20), dec!(50), 5, false),
            invoice(date(2025, 10, 2), dec!(70), 7, true),
        ];

        let rollup = rollup_invoices(&rows);
        assert_eq!(rollup.len(), 2);

        let september = &rollup[0];
        assert_eq!(september.month.key(), "2025-09");
        assert_eq!(september.count, 2);
        assert_eq!(september.total_due, dec!(150));
        assert_eq!(september.kwh, 15);
        assert_eq!(september.paid_due, dec!(100));

        let october = &rollup[1];
        assert_eq!(october.count, 1);
        assert_eq!(october.paid_due, dec!(70));
    }

    #[test]
    fn test_rollup_expenses_groups_by_month() {
        let mk = |d: NaiveDate, cost: Decimal| expenses::Model {
            id: Uuid::new_v4(),
            date: d,
            kind: ExpenseKind::Fuel,
            cost,
            litres: None,
            description: None,
            created_at: Utc::now().into(),
        };

        let rollup = rollup_expenses(&[
            mk(date(2025, 9, 3), dec!(1.25)),
            mk(date(2025, 9, 9), dec!(0.75)),
        ]);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].total, dec!(2.00));
    }

    #[test]
    fn test_range_bounds_default_to_current_month() {
        let today = date(2025, 9, 15);
        let (lower, upper) = range_bounds(None, None, today);
        assert_eq!(lower, Some(date(2025, 9, 1)));
        assert_eq!(upper, Some(date(2025, 10, 1)));
    }

    #[test]
    fn test_range_bounds_inclusive_end_month() {
        let start: BillingMonth = "2025-07".parse().unwrap();
        let end: BillingMonth = "2025-09".parse().unwrap();
        let (lower, upper) = range_bounds(Some(start), Some(end), date(2026, 1, 1));
        assert_eq!(lower, Some(date(2025, 7, 1)));
        // End month is inclusive: the bound is the first day after it.
        assert_eq!(upper, Some(date(2025, 10, 1)));
    }

    #[test]
    fn test_range_bounds_open_ended() {
        let start: BillingMonth = "2025-07".parse().unwrap();
        let (lower, upper) = range_bounds(Some(start), None, date(2026, 1, 1));
        assert_eq!(lower, Some(date(2025, 7, 1)));
        assert_eq!(upper, None);
    }
}
