use std::str::FromStr;

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use liftgate_core::{AppError, AppResult, Guard, NonEmptyString, UserId};
use liftgate_domain::{
    EmailAddress, LifecycleState, Permission, PermissionId, PermissionScope, RbacName, Role,
    RoleId, User,
};

mod edges;
mod integrity;
mod records;

/// PostgreSQL-backed store for users, roles, permissions and their edges.
///
/// Full-replace operations lock the owning role or user row and apply the
/// difference inside one transaction.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: Option<String>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    guard: String,
    name: String,
    display_name: String,
    description: Option<String>,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    guard: String,
    name: String,
    display_name: String,
    description: Option<String>,
    category: Option<String>,
    scope: String,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct GuardedIdRow {
    id: Uuid,
    guard: String,
}

fn parse_guard(value: &str, record: &str) -> AppResult<Guard> {
    Guard::from_str(value).map_err(|_| {
        AppError::InvalidState(format!("{record} is stored with unknown guard '{value}'"))
    })
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        Ok(User::new(
            UserId::from_uuid(row.id),
            EmailAddress::new(row.email)?,
            NonEmptyString::new(row.display_name)?,
            row.password_hash,
        ))
    }
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> AppResult<Self> {
        let guard = parse_guard(&row.guard, &format!("role '{}'", row.name))?;

        Ok(Role::from_parts(
            RoleId::from_uuid(row.id),
            guard,
            RbacName::new(row.name)?,
            NonEmptyString::new(row.display_name)?,
            row.description,
            LifecycleState::from_active_flag(row.is_active),
        ))
    }
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> AppResult<Self> {
        let guard = parse_guard(&row.guard, &format!("permission '{}'", row.name))?;

        Ok(Permission::new(
            PermissionId::from_uuid(row.id),
            guard,
            RbacName::new(row.name)?,
            NonEmptyString::new(row.display_name)?,
            row.category,
            PermissionScope::from_str(row.scope.as_str())?,
        )
        .with_description(row.description)
        .with_state(LifecycleState::from_active_flag(row.is_active)))
    }
}

fn map_write_error(error: sqlx::Error, subject: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => return AppError::Validation(format!("{subject} already exists")),
            Some("23503") => {
                return AppError::NotFound(format!("{subject} references a missing record"));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to write {subject}: {error}"))
}

#[cfg(test)]
mod tests;
