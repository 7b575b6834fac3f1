//! `SeaORM` Entity for the invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One billing record for one branch in one month.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Surrogate id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Globally unique `YYYYMM-SEQ` identifier.
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Invoice date; its calendar month is the grouping key.
    pub date: Date,
    /// Customer name.
    pub customer_name: String,
    /// Meter serial.
    pub meter_number: Option<String>,
    /// Branch number, the per-customer grouping key.
    pub branch_number: String,
    /// Amperage tier (5/10/15/20; anything else carries no fee).
    pub subscription_amps: i32,
    /// Previous meter reading.
    pub prev_reading: i32,
    /// Current meter reading.
    pub curr_reading: i32,
    /// Frozen price per kWh, base currency.
    pub unit_price: Decimal,
    /// Frozen flat monthly fee, base currency.
    pub subscription_fee: Decimal,
    /// Derived consumption, clamped at zero.
    pub kwh_used: i32,
    /// Derived `kwh_used x unit_price`.
    pub energy_cost: Decimal,
    /// Derived flat component (equals the frozen fee).
    pub month_cost: Decimal,
    /// Derived total owed.
    pub total_due: Decimal,
    /// Payment flag.
    pub is_paid: bool,
    /// Row creation time; recency tiebreaker.
    pub created_at: DateTimeWithTimeZone,
    /// Last mutation time.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
