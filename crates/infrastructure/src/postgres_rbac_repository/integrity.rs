use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use liftgate_application::{GuardIntegrityIssue, GuardIntegrityRepository};
use liftgate_core::{AppError, AppResult, Guard};

use super::PostgresRbacRepository;

#[derive(Debug, FromRow)]
struct UnknownGuardRow {
    id: Uuid,
    name: String,
    guard: String,
}

#[derive(Debug, FromRow)]
struct CrossGuardRow {
    role_name: String,
    role_guard: String,
    permission_name: String,
    permission_guard: String,
}

#[async_trait]
impl GuardIntegrityRepository for PostgresRbacRepository {
    async fn find_guard_integrity_issues(&self) -> AppResult<Vec<GuardIntegrityIssue>> {
        let known_guards = Guard::all()
            .iter()
            .map(|guard| guard.as_str().to_owned())
            .collect::<Vec<_>>();

        let unknown_roles = sqlx::query_as::<_, UnknownGuardRow>(
            "SELECT id, name, guard FROM roles WHERE NOT (guard = ANY($1)) ORDER BY name",
        )
        .bind(&known_guards)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check role guards: {error}")))?;

        let unknown_permissions = sqlx::query_as::<_, UnknownGuardRow>(
            "SELECT id, name, guard FROM permissions WHERE NOT (guard = ANY($1)) ORDER BY name",
        )
        .bind(&known_guards)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check permission guards: {error}"))
        })?;

        let cross_guard = sqlx::query_as::<_, CrossGuardRow>(
            r#"
            SELECT
                roles.name AS role_name,
                roles.guard AS role_guard,
                permissions.name AS permission_name,
                permissions.guard AS permission_guard
            FROM role_permissions
            INNER JOIN roles
                ON roles.id = role_permissions.role_id
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE roles.guard <> permissions.guard
            ORDER BY roles.name, permissions.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check grant guards: {error}")))?;

        let issues = unknown_roles
            .into_iter()
            .map(|row| GuardIntegrityIssue::UnknownRoleGuard {
                role_id: row.id.to_string(),
                role_name: row.name,
                guard: row.guard,
            })
            .chain(
                unknown_permissions
                    .into_iter()
                    .map(|row| GuardIntegrityIssue::UnknownPermissionGuard {
                        permission_id: row.id.to_string(),
                        permission_name: row.name,
                        guard: row.guard,
                    }),
            )
            .chain(
                cross_guard
                    .into_iter()
                    .map(|row| GuardIntegrityIssue::CrossGuardGrant {
                        role_name: row.role_name,
                        role_guard: row.role_guard,
                        permission_name: row.permission_name,
                        permission_guard: row.permission_guard,
                    }),
            )
            .collect();

        Ok(issues)
    }
}
