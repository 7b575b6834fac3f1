//! Expense repository.
//!
//! Expenses are the cost side of the monthly net figure. Costs are
//! recorded in DISPLAY currency and never pass through the conversion
//! rate.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{expenses, sea_orm_active_enums::ExpenseKind};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Unknown expense kind token at a boundary.
    #[error("invalid expense kind: {0}")]
    InvalidKind(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Expense date; today when absent.
    pub date: Option<NaiveDate>,
    /// Classification.
    pub kind: ExpenseKind,
    /// Cost in display currency.
    pub cost: Decimal,
    /// Fuel volume; meaningful for fuel expenses only.
    pub litres: Option<Decimal>,
    /// Free-text note.
    pub description: Option<String>,
}

/// One day's expense total.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DailyExpense {
    /// The day.
    pub date: NaiveDate,
    /// Total cost.
    pub total: Decimal,
}

/// Summary payload over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExpenseSummary {
    /// Totals per kind (`fuel`/`maintenance`/`other`).
    pub by_kind: BTreeMap<String, Decimal>,
    /// Totals per day, ascending.
    pub by_day: Vec<DailyExpense>,
    /// Total fuel volume.
    pub fuel_litres: Decimal,
    /// Grand total.
    pub total: Decimal,
}

/// Parses a boundary token into an expense kind.
///
/// # Errors
///
/// Returns `ExpenseError::InvalidKind` for anything outside the fixed
/// vocabulary.
pub fn parse_kind(token: &str) -> Result<ExpenseKind, ExpenseError> {
    match token.trim().to_lowercase().as_str() {
        "fuel" => Ok(ExpenseKind::Fuel),
        "maintenance" => Ok(ExpenseKind::Maintenance),
        "other" => Ok(ExpenseKind::Other),
        other => Err(ExpenseError::InvalidKind(other.to_string())),
    }
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense.
    pub async fn create(&self, input: CreateExpenseInput) -> Result<expenses::Model, ExpenseError> {
        let row = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            date: Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
            kind: Set(input.kind),
            cost: Set(input.cost),
            litres: Set(input.litres),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        };
        Ok(row.insert(&self.db).await?)
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: Uuid) -> Result<(), ExpenseError> {
        let result = expenses::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ExpenseError::NotFound(id));
        }
        Ok(())
    }

    /// Recent expenses, newest first, capped.
    pub async fn list(&self, limit: u64) -> Result<Vec<expenses::Model>, ExpenseError> {
        Ok(expenses::Entity::find()
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    /// Summary over an optional date range: totals by kind, by day, fuel
    /// volume, and the grand total.
    pub async fn summary(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<ExpenseSummary, ExpenseError> {
        let mut query = expenses::Entity::find();
        if let Some(from) = date_from {
            query = query.filter(expenses::Column::Date.gte(from));
        }
        if let Some(to) = date_to {
            query = query.filter(expenses::Column::Date.lte(to));
        }
        let rows = query
            .order_by_asc(expenses::Column::Date)
            .all(&self.db)
            .await?;

        let mut summary = ExpenseSummary::default();
        let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

        for row in &rows {
            let kind = match row.kind {
                ExpenseKind::Fuel => "fuel",
                ExpenseKind::Maintenance => "maintenance",
                ExpenseKind::Other => "other",
            };
            *summary
                .by_kind
                .entry(kind.to_string())
                .or_insert(Decimal::ZERO) += row.cost;
            *by_day.entry(row.date).or_insert(Decimal::ZERO) += row.cost;
            summary.total += row.cost;

            if row.kind == ExpenseKind::Fuel
                && let Some(litres) = row.litres
            {
                summary.fuel_litres += litres;
            }
        }

        summary.by_day = by_day
            .into_iter()
            .map(|(date, total)| DailyExpense { date, total })
            .collect();

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_vocabulary() {
        assert_eq!(parse_kind("fuel").unwrap(), ExpenseKind::Fuel);
        assert_eq!(parse_kind(" Maintenance ").unwrap(), ExpenseKind::Maintenance);
        assert_eq!(parse_kind("OTHER").unwrap(), ExpenseKind::Other);
        assert!(matches!(
            parse_kind("groceries"),
            Err(ExpenseError::InvalidKind(_))
        ));
    }
}
