//! Export data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed export column order, identical for CSV and spreadsheet
/// output. Field order of [`ExportRow`] must match.
pub const EXPORT_HEADERS: [&str; 16] = [
    "id",
    "invoice_number",
    "date",
    "customer_name",
    "meter_number",
    "branch_number",
    "subscription_amps",
    "prev_reading",
    "curr_reading",
    "kwh_used",
    "unit_price",
    "energy_cost",
    "subscription_fee",
    "month_cost",
    "total_due",
    "is_paid",
];

/// One invoice as exported. Serialization order is the export contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Surrogate id.
    pub id: Uuid,
    /// Invoice number.
    pub invoice_number: String,
    /// Invoice date (ISO).
    pub date: NaiveDate,
    /// Customer name.
    pub customer_name: String,
    /// Meter serial.
    pub meter_number: String,
    /// Branch number.
    pub branch_number: String,
    /// Amperage tier.
    pub subscription_amps: i32,
    /// Previous meter reading.
    pub prev_reading: i32,
    /// Current meter reading.
    pub curr_reading: i32,
    /// Derived consumption.
    pub kwh_used: i32,
    /// Frozen price per kWh (base currency).
    pub unit_price: Decimal,
    /// Derived energy cost.
    pub energy_cost: Decimal,
    /// Frozen subscription fee.
    pub subscription_fee: Decimal,
    /// Derived flat component.
    pub month_cost: Decimal,
    /// Derived total.
    pub total_due: Decimal,
    /// Payment flag, exported as `0`/`1`.
    pub is_paid: u8,
}
