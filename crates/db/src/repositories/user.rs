//! User repository.
//!
//! Login and sessions live outside this system; the repository manages the
//! records themselves: unique usernames, Argon2id hashes at rest, and the
//! employee scoping fields.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use gridbill_core::auth::{self, PasswordError};

use crate::entities::{users, sea_orm_active_enums::UserRole};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Username already taken.
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    /// Username or password missing/empty.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Unique login name.
    pub username: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Role.
    pub role: UserRole,
    /// Branch an employee is assigned to.
    pub branch_number: Option<String>,
    /// Hide invoices dated before this from the employee.
    pub min_visible_date: Option<NaiveDate>,
    /// Admin override flag.
    pub is_admin: bool,
}

/// Input for editing a user. `username`, `password`, and `role` keep their
/// current value when `None`; the scoping fields are overwritten as given.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New login name.
    pub username: Option<String>,
    /// New password (rotates the hash).
    pub password: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New branch assignment (cleared when `None`).
    pub branch_number: Option<String>,
    /// New visibility floor (cleared when `None`).
    pub min_visible_date: Option<NaiveDate>,
    /// Admin override flag.
    pub is_admin: bool,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user with a hashed password.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let username = input.username.trim().to_string();
        if username.is_empty() || input.password.trim().is_empty() {
            return Err(UserError::Validation(
                "username and password are required".into(),
            ));
        }

        if self.find_by_username(&username).await?.is_some() {
            return Err(UserError::DuplicateUsername(username));
        }

        let now = Utc::now().into();
        let row = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            password_hash: Set(auth::hash_password(&input.password)?),
            role: Set(input.role),
            branch_number: Set(input.branch_number),
            min_visible_date: Set(input.min_visible_date),
            is_admin: Set(input.is_admin),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(row.insert(&self.db).await?)
    }

    /// Edits a user; username uniqueness excludes the user itself.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<users::Model, UserError> {
        let existing = self.get(id).await?;
        let mut active: users::ActiveModel = existing.into();

        if let Some(username) = input.username.map(|u| u.trim().to_string())
            && !username.is_empty()
        {
            if let Some(other) = self.find_by_username(&username).await?
                && other.id != id
            {
                return Err(UserError::DuplicateUsername(username));
            }
            active.username = Set(username);
        }
        if let Some(password) = input.password.filter(|p| !p.trim().is_empty()) {
            active.password_hash = Set(auth::hash_password(&password)?);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.branch_number = Set(input.branch_number);
        active.min_visible_date = Set(input.min_visible_date);
        active.is_admin = Set(input.is_admin);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a user.
    pub async fn delete(&self, id: Uuid) -> Result<(), UserError> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// Fetches one user.
    pub async fn get(&self, id: Uuid) -> Result<users::Model, UserError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Looks a user up by login name.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// All users, newest first.
    pub async fn list(&self) -> Result<Vec<users::Model>, UserError> {
        Ok(users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
