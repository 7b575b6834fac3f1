//! Adds the dual-currency columns to pricing.
//!
//! Additive only. Deployments that predate this migration are also healed
//! at runtime by `PricingRepository` with the same statements.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// The additive column statements, shared with the runtime self-heal.
pub const ADD_CURRENCY_COLUMNS_SQL: &str = r"
ALTER TABLE pricing
    ADD COLUMN IF NOT EXISTS currency_code currency_unit NOT NULL DEFAULT 'base';
ALTER TABLE pricing
    ADD COLUMN IF NOT EXISTS conversion_rate NUMERIC(18, 6) NOT NULL DEFAULT 90000;
";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(ADD_CURRENCY_COLUMNS_SQL)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r"
ALTER TABLE pricing DROP COLUMN IF EXISTS conversion_rate;
ALTER TABLE pricing DROP COLUMN IF EXISTS currency_code;
",
            )
            .await?;
        Ok(())
    }
}
