//! `SeaORM` Entity for the per-month invoice-number counter.
//!
//! One row per `YYYYMM`; `last_suffix` is advanced atomically inside the
//! same transaction as the invoice insert, which is what makes concurrent
//! allocation race-free.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Counter row for one month's invoice numbers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_sequences")]
pub struct Model {
    /// Compact month key, e.g. `"202509"`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub year_month: String,
    /// Highest suffix handed out (or observed from an import) so far.
    pub last_suffix: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
