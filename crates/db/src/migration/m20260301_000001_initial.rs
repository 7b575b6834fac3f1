//! Initial database migration.
//!
//! Creates the core tables, enums, indexes, and triggers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: USERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: PRICING
        // ============================================================
        db.execute_unprepared(PRICING_SQL).await?;

        // ============================================================
        // PART 4: INVOICES & NUMBER SEQUENCES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 5: EXPENSES
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Currency the admin views pricing figures in
CREATE TYPE currency_unit AS ENUM ('base', 'display');

-- Expense classification
CREATE TYPE expense_kind AS ENUM ('fuel', 'maintenance', 'other');

-- User roles
CREATE TYPE user_role AS ENUM ('admin', 'employee');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(64) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'employee',
    branch_number VARCHAR(64),
    min_visible_date DATE,
    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PRICING_SQL: &str = r"
-- Monetary figures are BASE currency. Effectively a singleton: the latest
-- row wins. (The currency columns arrived in a later migration.)
CREATE TABLE pricing (
    id UUID PRIMARY KEY,
    unit_price NUMERIC(18, 2) NOT NULL DEFAULT 0,
    fee_5 NUMERIC(18, 2) NOT NULL DEFAULT 0,
    fee_10 NUMERIC(18, 2) NOT NULL DEFAULT 0,
    fee_15 NUMERIC(18, 2) NOT NULL DEFAULT 0,
    fee_20 NUMERIC(18, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR(64) NOT NULL UNIQUE,
    date DATE NOT NULL,
    customer_name VARCHAR(255) NOT NULL,
    meter_number VARCHAR(64),
    branch_number VARCHAR(64) NOT NULL,
    subscription_amps INTEGER NOT NULL DEFAULT 0,
    prev_reading INTEGER NOT NULL DEFAULT 0,
    curr_reading INTEGER NOT NULL DEFAULT 0,
    unit_price NUMERIC(18, 2) NOT NULL DEFAULT 0,
    subscription_fee NUMERIC(18, 2) NOT NULL DEFAULT 0,
    kwh_used INTEGER NOT NULL DEFAULT 0,
    energy_cost NUMERIC(18, 2) NOT NULL DEFAULT 0,
    month_cost NUMERIC(18, 2) NOT NULL DEFAULT 0,
    total_due NUMERIC(18, 2) NOT NULL DEFAULT 0,
    is_paid BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoices_branch ON invoices (branch_number);
CREATE INDEX idx_invoices_date ON invoices (date);

-- At most one invoice per branch per calendar month. The repository
-- pre-check produces the friendly rejection carrying the conflicting
-- invoice number; this index is the authoritative guard under concurrency.
CREATE UNIQUE INDEX uq_invoices_branch_month
    ON invoices (branch_number, date_trunc('month', date));
";

const INVOICE_SEQUENCES_SQL: &str = r"
-- Per-month invoice-number counter, advanced atomically in the same
-- transaction as the invoice insert.
CREATE TABLE invoice_sequences (
    year_month CHAR(6) PRIMARY KEY,
    last_suffix INTEGER NOT NULL DEFAULT 0
);
";

const EXPENSES_SQL: &str = r"
-- Costs are recorded in DISPLAY currency.
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    date DATE NOT NULL,
    kind expense_kind NOT NULL,
    cost NUMERIC(18, 2) NOT NULL DEFAULT 0,
    litres NUMERIC(10, 2),
    description VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_expenses_date ON expenses (date);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at() RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_invoices_updated_at
    BEFORE UPDATE ON invoices
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_pricing_updated_at
    BEFORE UPDATE ON pricing
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS invoice_sequences;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS pricing;
DROP TABLE IF EXISTS users;
DROP FUNCTION IF EXISTS set_updated_at();
DROP TYPE IF EXISTS user_role;
DROP TYPE IF EXISTS expense_kind;
DROP TYPE IF EXISTS currency_unit;
";
