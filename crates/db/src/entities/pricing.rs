//! `SeaORM` Entity for the pricing table.
//!
//! Effectively a singleton: the latest row wins. Monetary figures are
//! always stored in BASE currency; `currency_code` only records which
//! currency the administrator was viewing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CurrencyUnit;

/// The mutable price/fee/currency configuration row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pricing")]
pub struct Model {
    /// Surrogate id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Price per kWh, base currency.
    pub unit_price: Decimal,
    /// Flat monthly fee, 5A tier.
    pub fee_5: Decimal,
    /// Flat monthly fee, 10A tier.
    pub fee_10: Decimal,
    /// Flat monthly fee, 15A tier.
    pub fee_15: Decimal,
    /// Flat monthly fee, 20A tier.
    pub fee_20: Decimal,
    /// The currency the admin is viewing figures in.
    pub currency_code: CurrencyUnit,
    /// Conversion rate, base units per display unit.
    pub conversion_rate: Decimal,
    /// Last admin save.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
