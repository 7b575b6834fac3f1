//! `SeaORM` Entity for the users table.
//!
//! Login/session handling is outside this system; the rows exist for
//! record keeping and employee scoping.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

/// A staff account.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Surrogate id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Unique login name.
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
    /// Branch an employee is assigned to.
    pub branch_number: Option<String>,
    /// Employees cannot see invoices dated before this.
    pub min_visible_date: Option<Date>,
    /// Admin override flag.
    pub is_admin: bool,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last mutation time.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
