//! Invoice repository: creation paths, duplicate guard, atomic numbering,
//! repricing, import/export, and reporting rollups.
//!
//! The one-invoice-per-branch-per-month rule is enforced twice: a pre-check
//! that produces the friendly rejection carrying the conflicting invoice
//! number, and the `uq_invoices_branch_month` unique index as the
//! authoritative guard under concurrency. Invoice numbers come from a
//! per-month counter row advanced atomically inside the same transaction as
//! the insert, so concurrent creators can never mint the same number.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, Statement,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use gridbill_core::billing::{BillingService, PricingSnapshot};
use gridbill_core::export::ExportRow;
use gridbill_core::import::{ImportService, ParseMode, ParsedRow};
use gridbill_core::numbering::{self, MAX_SUFFIX};
use gridbill_core::pricing::PriceSchedule;
use gridbill_shared::BillingMonth;

use crate::entities::invoices;

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// The branch already has an invoice in the target month.
    #[error("branch {branch} already has invoice {existing_number} for {month}")]
    DuplicateMonth {
        /// Branch number.
        branch: String,
        /// The contested month.
        month: BillingMonth,
        /// Number of the conflicting invoice, for display.
        existing_number: String,
    },

    /// Quick-create needs a prior invoice to carry values forward.
    #[error("branch {0} has no prior invoice to carry forward")]
    NoPriorInvoice(String),

    /// Quick-create rejects readings below the branch's last one.
    #[error("current reading {given} is below the last recorded reading {last}")]
    ReadingRegression {
        /// Last recorded reading.
        last: i32,
        /// The submitted reading.
        given: i32,
    },

    /// A caller-supplied invoice number does not match `YYYYMM-SEQ`.
    #[error("invalid invoice number: {0}")]
    BadInvoiceNumber(String),

    /// The four-digit sequence for a month ran out.
    #[error("invoice numbers exhausted for month {0}")]
    SequenceExhausted(String),

    /// Mark-paid on an invoice that is already paid.
    #[error("invoice {0} is already paid")]
    AlreadyPaid(Uuid),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Import parsing failed (strict mode or unreadable CSV).
    #[error(transparent)]
    Import(#[from] gridbill_core::import::ImportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for manual invoice creation. Unset fields fall back to the
/// branch's last invoice, then to the price schedule.
#[derive(Debug, Clone, Default)]
pub struct CreateInvoiceInput {
    /// Invoice date; today when absent.
    pub date: Option<NaiveDate>,
    /// Branch number (required).
    pub branch_number: String,
    /// Customer name; carried forward when absent.
    pub customer_name: Option<String>,
    /// Meter serial; carried forward when absent.
    pub meter_number: Option<String>,
    /// Amperage tier; carried forward when absent or zero.
    pub subscription_amps: Option<i32>,
    /// Previous reading; the branch's last current reading when absent.
    pub prev_reading: Option<i32>,
    /// Current reading; equal to the previous reading when absent.
    pub curr_reading: Option<i32>,
    /// Price per kWh (base currency); schedule default when absent or zero.
    pub unit_price: Option<Decimal>,
    /// Flat fee (base currency); last invoice's fee, then the tier default.
    pub subscription_fee: Option<Decimal>,
    /// Payment flag.
    pub is_paid: bool,
}

/// Input for an in-place edit. `None` keeps the existing value; derived
/// fields are always recomputed.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// New invoice date.
    pub date: Option<NaiveDate>,
    /// New branch number.
    pub branch_number: Option<String>,
    /// New customer name.
    pub customer_name: Option<String>,
    /// New meter serial.
    pub meter_number: Option<String>,
    /// New amperage tier.
    pub subscription_amps: Option<i32>,
    /// New previous reading.
    pub prev_reading: Option<i32>,
    /// New current reading.
    pub curr_reading: Option<i32>,
    /// New frozen price per kWh.
    pub unit_price: Option<Decimal>,
    /// New frozen flat fee.
    pub subscription_fee: Option<Decimal>,
    /// New payment flag.
    pub is_paid: Option<bool>,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by payment status.
    pub is_paid: Option<bool>,
    /// Restrict to one calendar month.
    pub month: Option<BillingMonth>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring over customer, branch, and number.
    pub search: Option<String>,
    /// Employee scoping: hide invoices dated before this.
    pub min_visible_date: Option<NaiveDate>,
}

/// Input for the month-scoped bulk reprice.
#[derive(Debug, Clone, Validate)]
pub struct BulkRepriceInput {
    /// Target month, 1-12.
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    /// Target year.
    #[validate(range(min = 1900))]
    pub year: i32,
    /// New price per kWh, BASE currency (no conversion applied).
    pub unit_price: Decimal,
}

/// Report rollup over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReportTotals {
    /// Number of invoices in range.
    pub total_invoices: u64,
    /// Total consumption.
    pub total_kwh: i64,
    /// Total billed (base currency).
    pub total_amount: Decimal,
    /// Paid invoices.
    pub paid_count: u64,
    /// Unpaid invoices.
    pub unpaid_count: u64,
}

/// Fully-resolved field set for one insert.
struct NewInvoiceRow {
    date: NaiveDate,
    branch_number: String,
    customer_name: String,
    meter_number: Option<String>,
    subscription_amps: i32,
    prev_reading: i32,
    curr_reading: i32,
    snapshot: PricingSnapshot,
    is_paid: bool,
    /// Caller-supplied number (import); allocated when `None`.
    invoice_number: Option<String>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Creation paths
    // ========================================================================

    /// Manual creation: the caller supplies whatever fields it has, the
    /// rest is carried forward from the branch's last invoice and the
    /// current price schedule is frozen in for anything still unset.
    pub async fn create(
        &self,
        input: CreateInvoiceInput,
        schedule: &PriceSchedule,
    ) -> Result<invoices::Model, InvoiceError> {
        let branch = input.branch_number.trim().to_string();
        if branch.is_empty() {
            return Err(InvoiceError::Validation("branch number is required".into()));
        }
        let date = input.date.unwrap_or_else(today);

        self.ensure_no_duplicate(&branch, date, None).await?;

        let last = self.last_for_branch(&branch).await?;

        let prev_reading = input
            .prev_reading
            .or_else(|| last.as_ref().map(|l| l.curr_reading))
            .unwrap_or(0);
        let curr_reading = input.curr_reading.unwrap_or(prev_reading);
        let customer_name = non_empty(input.customer_name)
            .or_else(|| last.as_ref().map(|l| l.customer_name.clone()))
            .unwrap_or_default();
        let meter_number = non_empty(input.meter_number)
            .or_else(|| last.as_ref().and_then(|l| l.meter_number.clone()));
        let subscription_amps = input
            .subscription_amps
            .filter(|amps| *amps != 0)
            .or_else(|| last.as_ref().map(|l| l.subscription_amps))
            .unwrap_or(0);

        // Fee falls back to the branch's last fee before the tier default.
        let fee = input
            .subscription_fee
            .or_else(|| last.as_ref().map(|l| l.subscription_fee));
        let snapshot =
            BillingService::fill_pricing(input.unit_price, fee, subscription_amps, schedule);

        let row = NewInvoiceRow {
            date,
            branch_number: branch.clone(),
            customer_name,
            meter_number,
            subscription_amps,
            prev_reading,
            curr_reading,
            snapshot,
            is_paid: input.is_paid,
            invoice_number: None,
        };

        let txn = self.db.begin().await?;
        match Self::insert_row(&txn, row).await {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(err) => {
                drop(txn);
                Err(self.annotate_duplicate(err, &branch, date).await)
            }
        }
    }

    /// Field quick-create: only a branch and a fresh reading. Everything
    /// else carries forward from the branch's last invoice; the unit price
    /// is the schedule's current one.
    pub async fn quick_create(
        &self,
        branch: &str,
        curr_reading: i32,
        schedule: &PriceSchedule,
    ) -> Result<invoices::Model, InvoiceError> {
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(InvoiceError::Validation("branch number is required".into()));
        }
        let date = today();

        self.ensure_no_duplicate(branch, date, None).await?;

        let last = self
            .last_for_branch(branch)
            .await?
            .ok_or_else(|| InvoiceError::NoPriorInvoice(branch.to_string()))?;

        if curr_reading < last.curr_reading {
            return Err(InvoiceError::ReadingRegression {
                last: last.curr_reading,
                given: curr_reading,
            });
        }

        let snapshot = BillingService::fill_pricing(
            Some(schedule.unit_price),
            Some(last.subscription_fee),
            last.subscription_amps,
            schedule,
        );

        let row = NewInvoiceRow {
            date,
            branch_number: branch.to_string(),
            customer_name: last.customer_name.clone(),
            meter_number: last.meter_number.clone(),
            subscription_amps: last.subscription_amps,
            prev_reading: last.curr_reading,
            curr_reading,
            snapshot,
            is_paid: false,
            invoice_number: None,
        };

        let txn = self.db.begin().await?;
        match Self::insert_row(&txn, row).await {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(err) => {
                drop(txn);
                Err(self.annotate_duplicate(err, branch, date).await)
            }
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Full-field edit with recompute. `None` inputs keep existing values.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        let existing = self.get(id).await?;

        let date = input.date.unwrap_or(existing.date);
        let branch = non_empty(input.branch_number).unwrap_or_else(|| existing.branch_number.clone());

        // The invoice being edited does not conflict with itself.
        self.ensure_no_duplicate(&branch, date, Some(id)).await?;

        let prev_reading = input.prev_reading.unwrap_or(existing.prev_reading);
        let curr_reading = input.curr_reading.unwrap_or(existing.curr_reading);
        let unit_price = input.unit_price.unwrap_or(existing.unit_price);
        let subscription_fee = input.subscription_fee.unwrap_or(existing.subscription_fee);
        let bill = BillingService::compute(prev_reading, curr_reading, unit_price, subscription_fee);

        let mut active: invoices::ActiveModel = existing.into();
        active.date = Set(date);
        active.branch_number = Set(branch.clone());
        if let Some(name) = non_empty(input.customer_name) {
            active.customer_name = Set(name);
        }
        if let Some(meter) = non_empty(input.meter_number) {
            active.meter_number = Set(Some(meter));
        }
        if let Some(amps) = input.subscription_amps {
            active.subscription_amps = Set(amps);
        }
        active.prev_reading = Set(prev_reading);
        active.curr_reading = Set(curr_reading);
        active.unit_price = Set(unit_price);
        active.subscription_fee = Set(subscription_fee);
        active.kwh_used = Set(bill.kwh_used);
        active.energy_cost = Set(bill.energy_cost);
        active.month_cost = Set(bill.month_cost);
        active.total_due = Set(bill.total_due);
        if let Some(paid) = input.is_paid {
            active.is_paid = Set(paid);
        }
        active.updated_at = Set(Utc::now().into());

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(err) => Err(self
                .annotate_duplicate(InvoiceError::Database(err), &branch, date)
                .await),
        }
    }

    /// Marks an invoice paid; rejects one that already is.
    pub async fn mark_paid(&self, id: Uuid) -> Result<invoices::Model, InvoiceError> {
        let existing = self.get(id).await?;
        if existing.is_paid {
            return Err(InvoiceError::AlreadyPaid(id));
        }
        let mut active: invoices::ActiveModel = existing.into();
        active.is_paid = Set(true);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Flips the payment flag.
    pub async fn toggle_paid(&self, id: Uuid) -> Result<invoices::Model, InvoiceError> {
        let existing = self.get(id).await?;
        let paid = !existing.is_paid;
        let mut active: invoices::ActiveModel = existing.into();
        active.is_paid = Set(paid);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes one invoice.
    pub async fn delete(&self, id: Uuid) -> Result<(), InvoiceError> {
        let result = invoices::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(InvoiceError::NotFound(id));
        }
        Ok(())
    }

    /// Deletes a batch of invoices in one transaction; returns the count.
    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, InvoiceError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let txn = self.db.begin().await?;
        let result = invoices::Entity::delete_many()
            .filter(invoices::Column::Id.is_in(ids.to_vec()))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        info!(count = result.rows_affected, "bulk deleted invoices");
        Ok(result.rows_affected)
    }

    /// Overwrites `unit_price` for every invoice dated in the target month
    /// and recomputes derived fields (the frozen fee is untouched). Runs as
    /// one all-or-nothing transaction and is idempotent.
    pub async fn bulk_reprice(&self, input: &BulkRepriceInput) -> Result<u64, InvoiceError> {
        input
            .validate()
            .map_err(|err| InvoiceError::Validation(err.to_string()))?;
        let month = BillingMonth::new(input.year, input.month)
            .ok_or_else(|| InvoiceError::Validation("month/year out of range".into()))?;
        let (first, next_first) = month.bounds();

        let txn = self.db.begin().await?;
        let rows = invoices::Entity::find()
            .filter(invoices::Column::Date.gte(first))
            .filter(invoices::Column::Date.lt(next_first))
            .all(&txn)
            .await?;

        let mut count: u64 = 0;
        for row in rows {
            let bill = BillingService::compute(
                row.prev_reading,
                row.curr_reading,
                input.unit_price,
                row.subscription_fee,
            );
            let mut active: invoices::ActiveModel = row.into();
            active.unit_price = Set(input.unit_price);
            active.kwh_used = Set(bill.kwh_used);
            active.energy_cost = Set(bill.energy_cost);
            active.month_cost = Set(bill.month_cost);
            active.total_due = Set(bill.total_due);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
            count += 1;
        }

        txn.commit().await?;
        info!(count, month = %month, "bulk repriced invoices");
        Ok(count)
    }

    // ========================================================================
    // Bulk import
    // ========================================================================

    /// Imports parsed rows in one all-or-nothing transaction; returns the
    /// number created.
    ///
    /// Lenient mode substitutes the documented fallbacks for unusable
    /// cells; strict mode aborts on the first one. A duplicate branch-month
    /// or malformed invoice number aborts the whole batch with zero rows
    /// imported. Rows without a branch number are skipped.
    pub async fn import(
        &self,
        rows: &[ParsedRow],
        mode: ParseMode,
        schedule: &PriceSchedule,
    ) -> Result<u64, InvoiceError> {
        if mode == ParseMode::Strict {
            ImportService::ensure_strict(rows)?;
        }

        let fallback_date = today();
        let txn = self.db.begin().await?;
        let mut created: u64 = 0;

        for row in rows {
            let Some(branch) = row.branch_number.clone() else {
                continue;
            };

            // Reads inside the transaction see rows imported earlier in
            // this same batch, so chained readings resolve in file order.
            let last = Self::last_for_branch_on(&txn, &branch).await?;

            let date = row.invoice_date.clone().ok().unwrap_or(fallback_date);
            if let Some(existing) = Self::find_in_month_on(&txn, &branch, date).await? {
                drop(txn);
                return Err(InvoiceError::DuplicateMonth {
                    branch,
                    month: BillingMonth::from_date(date),
                    existing_number: existing.invoice_number,
                });
            }

            let prev_reading = row
                .prev_reading
                .clone()
                .ok()
                .or_else(|| last.as_ref().map(|l| l.curr_reading))
                .unwrap_or(0);
            let curr_reading = row.curr_reading.clone().ok().unwrap_or(prev_reading);
            let customer_name = row
                .customer_name
                .clone()
                .or_else(|| last.as_ref().map(|l| l.customer_name.clone()))
                .unwrap_or_default();
            let meter_number = row
                .meter_number
                .clone()
                .or_else(|| last.as_ref().and_then(|l| l.meter_number.clone()));
            let subscription_amps = row
                .subscription_amps
                .clone()
                .ok()
                .or_else(|| last.as_ref().map(|l| l.subscription_amps))
                .unwrap_or(0);
            let unit_price = row
                .unit_price
                .clone()
                .ok()
                .or_else(|| last.as_ref().map(|l| l.unit_price));
            let fee = row
                .subscription_fee
                .clone()
                .ok()
                .or_else(|| last.as_ref().map(|l| l.subscription_fee));
            let snapshot =
                BillingService::fill_pricing(unit_price, fee, subscription_amps, schedule);

            let new_row = NewInvoiceRow {
                date,
                branch_number: branch.clone(),
                customer_name,
                meter_number,
                subscription_amps,
                prev_reading,
                curr_reading,
                snapshot,
                is_paid: row.is_paid.clone().ok().unwrap_or(false),
                invoice_number: row.invoice_number.clone(),
            };

            match Self::insert_row(&txn, new_row).await {
                Ok(_) => created += 1,
                Err(err) => {
                    drop(txn);
                    return Err(self.annotate_duplicate(err, &branch, date).await);
                }
            }
        }

        txn.commit().await?;
        info!(created, "imported invoices");
        Ok(created)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Fetches one invoice.
    pub async fn get(&self, id: Uuid) -> Result<invoices::Model, InvoiceError> {
        invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))
    }

    /// Lists invoices, newest first.
    pub async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<invoices::Model>, InvoiceError> {
        let mut query = invoices::Entity::find();

        if let Some(paid) = filter.is_paid {
            query = query.filter(invoices::Column::IsPaid.eq(paid));
        }
        if let Some(month) = filter.month {
            let (first, next_first) = month.bounds();
            query = query
                .filter(invoices::Column::Date.gte(first))
                .filter(invoices::Column::Date.lt(next_first));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(invoices::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(invoices::Column::Date.lte(to));
        }
        if let Some(min) = filter.min_visible_date {
            query = query.filter(invoices::Column::Date.gte(min));
        }
        if let Some(q) = filter.search.as_deref() {
            let pattern = format!("%{}%", q.trim());
            query = query.filter(
                Condition::any()
                    .add(Expr::col(invoices::Column::CustomerName).ilike(pattern.clone()))
                    .add(Expr::col(invoices::Column::BranchNumber).ilike(pattern.clone()))
                    .add(Expr::col(invoices::Column::InvoiceNumber).ilike(pattern)),
            );
        }

        Ok(query
            .order_by_desc(invoices::Column::CreatedAt)
            .order_by_desc(invoices::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Report rollup over a date range; defaults to the current month.
    pub async fn report(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<ReportTotals, InvoiceError> {
        let (date_from, date_to) = match (date_from, date_to) {
            (None, None) => {
                let (first, next_first) = BillingMonth::from_date(today()).bounds();
                (Some(first), Some(next_first - chrono::Days::new(1)))
            }
            bounds => bounds,
        };

        let mut query = invoices::Entity::find();
        if let Some(from) = date_from {
            query = query.filter(invoices::Column::Date.gte(from));
        }
        if let Some(to) = date_to {
            query = query.filter(invoices::Column::Date.lte(to));
        }
        let rows = query
            .order_by_asc(invoices::Column::Date)
            .all(&self.db)
            .await?;

        let mut totals = ReportTotals {
            total_invoices: rows.len() as u64,
            ..ReportTotals::default()
        };
        for row in &rows {
            totals.total_kwh += i64::from(row.kwh_used);
            totals.total_amount += row.total_due;
            if row.is_paid {
                totals.paid_count += 1;
            } else {
                totals.unpaid_count += 1;
            }
        }
        Ok(totals)
    }

    /// All invoices as export rows (optionally one month), newest first.
    pub async fn export_rows(
        &self,
        month: Option<BillingMonth>,
    ) -> Result<Vec<ExportRow>, InvoiceError> {
        let filter = InvoiceFilter {
            month,
            ..InvoiceFilter::default()
        };
        let rows = self.list(&filter).await?;
        Ok(rows.into_iter().map(to_export_row).collect())
    }

    /// Most recent invoice for a branch, by date then recency.
    pub async fn last_for_branch(
        &self,
        branch: &str,
    ) -> Result<Option<invoices::Model>, InvoiceError> {
        Ok(Self::last_for_branch_on(&self.db, branch).await?)
    }

    /// Most recent invoice for the branch in the month of `date`, or none.
    pub async fn find_in_month(
        &self,
        branch: &str,
        date: NaiveDate,
    ) -> Result<Option<invoices::Model>, InvoiceError> {
        Ok(Self::find_in_month_on(&self.db, branch, date).await?)
    }

    /// Boolean form of [`InvoiceRepository::find_in_month`].
    pub async fn has_in_month(&self, branch: &str, date: NaiveDate) -> Result<bool, InvoiceError> {
        Ok(self.find_in_month(branch, date).await?.is_some())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn last_for_branch_on<C: ConnectionTrait>(
        conn: &C,
        branch: &str,
    ) -> Result<Option<invoices::Model>, DbErr> {
        invoices::Entity::find()
            .filter(invoices::Column::BranchNumber.eq(branch))
            .order_by_desc(invoices::Column::Date)
            .order_by_desc(invoices::Column::CreatedAt)
            .one(conn)
            .await
    }

    async fn find_in_month_on<C: ConnectionTrait>(
        conn: &C,
        branch: &str,
        date: NaiveDate,
    ) -> Result<Option<invoices::Model>, DbErr> {
        let (first, next_first) = BillingMonth::from_date(date).bounds();
        invoices::Entity::find()
            .filter(invoices::Column::BranchNumber.eq(branch))
            .filter(invoices::Column::Date.gte(first))
            .filter(invoices::Column::Date.lt(next_first))
            .order_by_desc(invoices::Column::Date)
            .order_by_desc(invoices::Column::CreatedAt)
            .one(conn)
            .await
    }

    /// Pre-check half of the duplicate guard.
    async fn ensure_no_duplicate(
        &self,
        branch: &str,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<(), InvoiceError> {
        if let Some(existing) = self.find_in_month(branch, date).await?
            && Some(existing.id) != exclude
        {
            return Err(InvoiceError::DuplicateMonth {
                branch: branch.to_string(),
                month: BillingMonth::from_date(date),
                existing_number: existing.invoice_number,
            });
        }
        Ok(())
    }

    /// Inserts one invoice inside the caller's transaction, allocating (or
    /// observing) its number in the same transaction.
    async fn insert_row(
        txn: &DatabaseTransaction,
        row: NewInvoiceRow,
    ) -> Result<invoices::Model, InvoiceError> {
        let month = BillingMonth::from_date(row.date);
        let invoice_number = match row.invoice_number {
            Some(number) => {
                let parsed = numbering::parse_number(&number)
                    .ok_or_else(|| InvoiceError::BadInvoiceNumber(number.clone()))?;
                Self::observe_number(txn, &parsed.month, parsed.suffix).await?;
                number
            }
            None => Self::allocate_number(txn, month).await?,
        };

        let bill = BillingService::compute(
            row.prev_reading,
            row.curr_reading,
            row.snapshot.unit_price,
            row.snapshot.subscription_fee,
        );
        let now = Utc::now().into();

        let model = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(invoice_number),
            date: Set(row.date),
            customer_name: Set(row.customer_name),
            meter_number: Set(row.meter_number),
            branch_number: Set(row.branch_number),
            subscription_amps: Set(row.subscription_amps),
            prev_reading: Set(row.prev_reading),
            curr_reading: Set(row.curr_reading),
            unit_price: Set(row.snapshot.unit_price),
            subscription_fee: Set(row.snapshot.subscription_fee),
            kwh_used: Set(bill.kwh_used),
            energy_cost: Set(bill.energy_cost),
            month_cost: Set(bill.month_cost),
            total_due: Set(bill.total_due),
            is_paid: Set(row.is_paid),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        Ok(model)
    }

    /// Atomically advances the month's counter and formats the number.
    ///
    /// The upsert-returning statement serialises concurrent allocators on
    /// the counter row; combined with running inside the insert's
    /// transaction this removes the scan-then-insert race entirely.
    async fn allocate_number(
        txn: &DatabaseTransaction,
        month: BillingMonth,
    ) -> Result<String, InvoiceError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
INSERT INTO invoice_sequences (year_month, last_suffix)
VALUES ($1, 1)
ON CONFLICT (year_month)
DO UPDATE SET last_suffix = invoice_sequences.last_suffix + 1
RETURNING last_suffix
",
            [month.compact().into()],
        );

        let row = txn
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("invoice_sequences upsert".into()))?;
        let suffix: i32 = row.try_get("", "last_suffix")?;
        let suffix = u32::try_from(suffix)
            .map_err(|_| InvoiceError::SequenceExhausted(month.compact()))?;
        if suffix > MAX_SUFFIX {
            return Err(InvoiceError::SequenceExhausted(month.compact()));
        }

        Ok(numbering::format_number(month, suffix))
    }

    /// Raises the month's counter to at least a caller-supplied suffix so
    /// later allocations never collide with imported numbers.
    async fn observe_number(
        txn: &DatabaseTransaction,
        month: &BillingMonth,
        suffix: u32,
    ) -> Result<(), InvoiceError> {
        let suffix = i32::try_from(suffix)
            .map_err(|_| InvoiceError::SequenceExhausted(month.compact()))?;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
INSERT INTO invoice_sequences (year_month, last_suffix)
VALUES ($1, $2)
ON CONFLICT (year_month)
DO UPDATE SET last_suffix = GREATEST(invoice_sequences.last_suffix, EXCLUDED.last_suffix)
",
            [month.compact().into(), suffix.into()],
        );
        txn.execute(stmt).await?;
        Ok(())
    }

    /// Turns a backstop unique-index violation into the same rejection the
    /// pre-check produces, re-reading the conflicting number for display.
    async fn annotate_duplicate(
        &self,
        err: InvoiceError,
        branch: &str,
        date: NaiveDate,
    ) -> InvoiceError {
        let InvoiceError::Database(db_err) = &err else {
            return err;
        };
        let Some(SqlErr::UniqueConstraintViolation(msg)) = db_err.sql_err() else {
            return err;
        };
        if !msg.contains("uq_invoices_branch_month") {
            return err;
        }

        let existing_number = self
            .find_in_month(branch, date)
            .await
            .ok()
            .flatten()
            .map(|model| model.invoice_number)
            .unwrap_or_default();

        InvoiceError::DuplicateMonth {
            branch: branch.to_string(),
            month: BillingMonth::from_date(date),
            existing_number,
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Maps an invoice row onto the fixed export schema.
fn to_export_row(model: invoices::Model) -> ExportRow {
    ExportRow {
        id: model.id,
        invoice_number: model.invoice_number,
        date: model.date,
        customer_name: model.customer_name,
        meter_number: model.meter_number.unwrap_or_default(),
        branch_number: model.branch_number,
        subscription_amps: model.subscription_amps,
        prev_reading: model.prev_reading,
        curr_reading: model.curr_reading,
        kwh_used: model.kwh_used,
        unit_price: model.unit_price,
        energy_cost: model.energy_cost,
        subscription_fee: model.subscription_fee,
        month_cost: model.month_cost,
        total_due: model.total_due,
        is_paid: u8::from(model.is_paid),
    }
}

// ============================================================================
// Pure guard logic for property testing
// ============================================================================

/// A stored invoice reduced to what the duplicate guard looks at.
#[derive(Debug, Clone)]
pub struct StoredInvoice {
    /// Branch number.
    pub branch_number: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Invoice number.
    pub invoice_number: String,
}

/// Simulates the duplicate-guard query over in-memory rows: the most
/// recent invoice (by date, then insertion order) for the branch in the
/// month of `date`, or none.
#[must_use]
pub fn find_month_conflict<'a>(
    rows: &'a [StoredInvoice],
    branch: &str,
    date: NaiveDate,
) -> Option<&'a StoredInvoice> {
    let month = BillingMonth::from_date(date);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.branch_number == branch && month.contains(row.date))
        .max_by_key(|(idx, row)| (row.date, *idx))
        .map(|(_, row)| row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stored(branch: &str, d: NaiveDate, number: &str) -> StoredInvoice {
        StoredInvoice {
            branch_number: branch.to_string(),
            date: d,
            invoice_number: number.to_string(),
        }
    }

    #[test]
    fn test_conflict_found_same_branch_same_month() {
        let rows = vec![
            stored("101", date(2025, 9, 3), "202509-0001"),
            stored("102", date(2025, 9, 5), "202509-0002"),
        ];

        let hit = find_month_conflict(&rows, "101", date(2025, 9, 20)).unwrap();
        assert_eq!(hit.invoice_number, "202509-0001");
    }

    #[test]
    fn test_no_conflict_across_month_or_branch() {
        let rows = vec![stored("101", date(2025, 8, 31), "202508-0001")];

        assert!(find_month_conflict(&rows, "101", date(2025, 9, 1)).is_none());
        assert!(find_month_conflict(&rows, "103", date(2025, 8, 15)).is_none());
    }

    #[test]
    fn test_most_recent_conflict_wins() {
        // Legacy data can hold duplicates that predate the guard; the most
        // recent one is surfaced.
        let rows = vec![
            stored("101", date(2025, 9, 2), "202509-0001"),
            stored("101", date(2025, 9, 9), "202509-0004"),
            stored("101", date(2025, 9, 9), "202509-0005"),
        ];

        let hit = find_month_conflict(&rows, "101", date(2025, 9, 28)).unwrap();
        assert_eq!(hit.invoice_number, "202509-0005");
    }

    proptest! {
        /// The guard is exactly month-and-branch scoped: a conflict exists
        /// iff some row shares both.
        #[test]
        fn prop_guard_scope(
            day_a in 1u32..29,
            day_b in 1u32..29,
            month_a in 1u32..13,
            month_b in 1u32..13,
            same_branch in any::<bool>(),
        ) {
            let branch_a = "101";
            let branch_b = if same_branch { "101" } else { "202" };
            let rows = vec![stored(branch_a, date(2025, month_a, day_a), "x")];

            let hit = find_month_conflict(&rows, branch_b, date(2025, month_b, day_b));
            let expected = same_branch && month_a == month_b;
            prop_assert_eq!(hit.is_some(), expected);
        }
    }

    #[test]
    fn test_bulk_reprice_input_bounds() {
        let ok = BulkRepriceInput {
            month: 9,
            year: 2025,
            unit_price: dec!(1800),
        };
        assert!(ok.validate().is_ok());

        let bad_month = BulkRepriceInput {
            month: 13,
            year: 2025,
            unit_price: dec!(1800),
        };
        assert!(bad_month.validate().is_err());

        let bad_year = BulkRepriceInput {
            month: 1,
            year: 1850,
            unit_price: dec!(1800),
        };
        assert!(bad_year.validate().is_err());
    }

    #[test]
    fn test_export_row_mapping() {
        let model = invoices::Model {
            id: Uuid::new_v4(),
            invoice_number: "202509-0001".to_string(),
            date: date(2025, 9, 1),
            customer_name: "Imad Haddad".to_string(),
            meter_number: None,
            branch_number: "101".to_string(),
            subscription_amps: 10,
            prev_reading: 3200,
            curr_reading: 3500,
            unit_price: dec!(1500),
            subscription_fee: dec!(20000),
            kwh_used: 300,
            energy_cost: dec!(450000),
            month_cost: dec!(20000),
            total_due: dec!(470000),
            is_paid: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        let row = to_export_row(model);
        assert_eq!(row.invoice_number, "202509-0001");
        assert_eq!(row.meter_number, "");
        assert_eq!(row.kwh_used, 300);
        assert_eq!(row.total_due, dec!(470000));
        assert_eq!(row.is_paid, 1);
    }
}
