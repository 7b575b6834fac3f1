//! Import data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the import parser.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The CSV reader failed (malformed quoting, IO error).
    #[error("failed to read import data: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be parsed (strict mode only).
    #[error("row {line}: column '{column}' has unusable value '{raw}'")]
    BadCell {
        /// 1-based data row number.
        line: usize,
        /// Logical column name.
        column: &'static str,
        /// The raw cell contents.
        raw: String,
    },
}

/// How the import treats unparseable cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Substitute the documented fallback for every unusable cell.
    #[default]
    Lenient,
    /// Abort the batch on the first unusable cell.
    Strict,
}

/// The logical columns of a bulk-import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportColumn {
    /// Branch (grouping) number.
    BranchNumber,
    /// Customer name.
    CustomerName,
    /// Meter serial.
    MeterNumber,
    /// Amperage tier.
    SubscriptionAmps,
    /// Price per kWh.
    UnitPrice,
    /// Flat monthly fee.
    SubscriptionFee,
    /// Current meter reading.
    CurrReading,
    /// Previous meter reading.
    PrevReading,
    /// Invoice date.
    InvoiceDate,
    /// Explicit invoice number.
    InvoiceNumber,
    /// Payment flag.
    IsPaid,
}

impl ImportColumn {
    /// Canonical (header) name of the column.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BranchNumber => "branch_number",
            Self::CustomerName => "customer_name",
            Self::MeterNumber => "meter_number",
            Self::SubscriptionAmps => "subscription_amps",
            Self::UnitPrice => "unit_price",
            Self::SubscriptionFee => "subscription_fee",
            Self::CurrReading => "curr_reading",
            Self::PrevReading => "prev_reading",
            Self::InvoiceDate => "invoice_date",
            Self::InvoiceNumber => "invoice_number",
            Self::IsPaid => "is_paid",
        }
    }

    /// Header spellings recognised for the column, compared after
    /// normalisation (lowercased, spaces/underscores stripped).
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::BranchNumber => &["branch_number", "branch"],
            Self::CustomerName => &["customer_name", "customer", "name", "subscriber"],
            Self::MeterNumber => &["meter_number", "meter"],
            Self::SubscriptionAmps => &["subscription_amps", "amps", "amperage"],
            Self::UnitPrice => &["unit_price", "price_per_kwh", "kwh_price"],
            Self::SubscriptionFee => &["subscription_fee", "monthly_fee", "fee"],
            Self::CurrReading => &["curr_reading", "current_reading", "reading"],
            Self::PrevReading => &["prev_reading", "previous_reading"],
            Self::InvoiceDate => &["invoice_date", "date"],
            Self::InvoiceNumber => &["invoice_number", "invoice_no", "no"],
            Self::IsPaid => &["is_paid", "paid", "status"],
        }
    }
}

/// Outcome of parsing one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The cell held a usable value.
    Value(T),
    /// The cell was absent or empty.
    Missing,
    /// The cell held something unusable; the raw text is kept for
    /// strict-mode error reporting.
    Invalid(String),
}

impl<T> Parsed<T> {
    /// The parsed value, if there was one.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing | Self::Invalid(_) => None,
        }
    }

    /// The raw text of an unusable cell.
    pub fn invalid_raw(&self) -> Option<&str> {
        match self {
            Self::Invalid(raw) => Some(raw),
            Self::Value(_) | Self::Missing => None,
        }
    }
}

/// One import row with every recognised cell parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based data row number (header excluded).
    pub line: usize,
    /// Branch number; rows without one are skipped by the importer.
    pub branch_number: Option<String>,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Meter serial.
    pub meter_number: Option<String>,
    /// Amperage tier.
    pub subscription_amps: Parsed<i32>,
    /// Price per kWh (base currency).
    pub unit_price: Parsed<Decimal>,
    /// Flat monthly fee (base currency).
    pub subscription_fee: Parsed<Decimal>,
    /// Current meter reading.
    pub curr_reading: Parsed<i32>,
    /// Previous meter reading.
    pub prev_reading: Parsed<i32>,
    /// Invoice date.
    pub invoice_date: Parsed<NaiveDate>,
    /// Explicit invoice number.
    pub invoice_number: Option<String>,
    /// Payment flag.
    pub is_paid: Parsed<bool>,
}

impl ParsedRow {
    /// The first unusable cell in the row, if any — the strict-mode
    /// rejection signal.
    #[must_use]
    pub fn first_invalid(&self) -> Option<(ImportColumn, String)> {
        let pairs: [(ImportColumn, Option<&str>); 7] = [
            (
                ImportColumn::SubscriptionAmps,
                self.subscription_amps.invalid_raw(),
            ),
            (ImportColumn::UnitPrice, self.unit_price.invalid_raw()),
            (
                ImportColumn::SubscriptionFee,
                self.subscription_fee.invalid_raw(),
            ),
            (ImportColumn::CurrReading, self.curr_reading.invalid_raw()),
            (ImportColumn::PrevReading, self.prev_reading.invalid_raw()),
            (ImportColumn::InvoiceDate, self.invoice_date.invalid_raw()),
            (ImportColumn::IsPaid, self.is_paid.invalid_raw()),
        ];

        pairs
            .into_iter()
            .find_map(|(column, raw)| raw.map(|r| (column, r.to_string())))
    }
}
