//! `SeaORM` Entity for the expenses table.
//!
//! Expense costs are recorded in DISPLAY currency and are never converted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ExpenseKind;

/// One operating expense.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Surrogate id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Expense date.
    pub date: Date,
    /// Classification.
    pub kind: ExpenseKind,
    /// Cost in display currency.
    pub cost: Decimal,
    /// Fuel volume, fuel expenses only.
    pub litres: Option<Decimal>,
    /// Free-text note.
    pub description: Option<String>,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
