//! Postgres enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The currency a pricing row is being viewed/entered in.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "currency_unit")]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    /// Stored/base currency.
    #[sea_orm(string_value = "base")]
    Base,
    /// Display currency, converted at the boundary.
    #[sea_orm(string_value = "display")]
    Display,
}

impl From<CurrencyUnit> for gridbill_shared::CurrencyUnit {
    fn from(unit: CurrencyUnit) -> Self {
        match unit {
            CurrencyUnit::Base => Self::Base,
            CurrencyUnit::Display => Self::Display,
        }
    }
}

impl From<gridbill_shared::CurrencyUnit> for CurrencyUnit {
    fn from(unit: gridbill_shared::CurrencyUnit) -> Self {
        match unit {
            gridbill_shared::CurrencyUnit::Base => Self::Base,
            gridbill_shared::CurrencyUnit::Display => Self::Display,
        }
    }
}

/// Expense classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_kind")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    /// Generator fuel; the only kind that carries litres.
    #[sea_orm(string_value = "fuel")]
    Fuel,
    /// Maintenance work.
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Manages pricing, users, corrections, and reporting.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Records readings and creates invoices in the field.
    #[sea_orm(string_value = "employee")]
    Employee,
}
