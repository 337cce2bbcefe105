use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use liftgate_application::{RolePermissionRepository, UserRoleRepository};
use liftgate_core::{AppError, AppResult, Guard, UserId};
use liftgate_domain::{Permission, PermissionId, Role, RoleId};

use super::{
    GuardedIdRow, PermissionRow, PostgresRbacRepository, RoleRow, map_write_error, parse_guard,
};

#[async_trait]
impl RolePermissionRepository for PostgresRbacRepository {
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, &format!("grant on role '{role_id}'")))?;

        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permission: {error}")))?;

        Ok(())
    }

    async fn replace_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<()> {
        let desired = permission_ids
            .iter()
            .map(PermissionId::as_uuid)
            .collect::<Vec<_>>();

        let mut transaction = begin(&self.pool).await?;

        let role_guard = sqlx::query_scalar::<_, String>(
            "SELECT guard FROM roles WHERE id = $1 FOR UPDATE",
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let found = sqlx::query_as::<_, GuardedIdRow>(
            "SELECT id, guard FROM permissions WHERE id = ANY($1)",
        )
        .bind(&desired)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;
        ensure_same_guard(&desired, &found, &role_guard, "permission")?;

        let removed = sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1 AND NOT (permission_id = ANY($2))
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(&desired)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove permissions: {error}")))?
        .rows_affected();

        let added = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, permission_id
            FROM UNNEST($2::uuid[]) AS desired(permission_id)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(&desired)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_write_error(error, &format!("grants of role '{role_id}'")))?
        .rows_affected();

        commit(transaction).await?;

        debug!(%role_id, added, removed, "role permission edges replaced");
        Ok(())
    }

    async fn list_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                permissions.id,
                permissions.guard,
                permissions.name,
                permissions.display_name,
                permissions.description,
                permissions.category,
                permissions.scope,
                permissions.is_active
            FROM role_permissions
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permissions for role: {error}"))
        })?;

        rows.into_iter().map(Permission::try_from).collect()
    }
}

#[async_trait]
impl UserRoleRepository for PostgresRbacRepository {
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, &format!("role assignment of user '{user_id}'")))?;

        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id.as_uuid())
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to detach role: {error}")))?;

        Ok(())
    }

    async fn replace_roles(
        &self,
        user_id: UserId,
        guard: Guard,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<()> {
        let desired = role_ids.iter().map(RoleId::as_uuid).collect::<Vec<_>>();

        let mut transaction = begin(&self.pool).await?;

        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to lock user: {error}")))?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        let found = sqlx::query_as::<_, GuardedIdRow>("SELECT id, guard FROM roles WHERE id = ANY($1)")
            .bind(&desired)
            .fetch_all(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load roles: {error}")))?;
        ensure_same_guard(&desired, &found, guard.as_str(), "role")?;

        let removed = sqlx::query(
            r#"
            DELETE FROM user_roles
            USING roles
            WHERE user_roles.role_id = roles.id
              AND user_roles.user_id = $1
              AND roles.guard = $2
              AND NOT (user_roles.role_id = ANY($3))
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(guard.as_str())
        .bind(&desired)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove roles: {error}")))?
        .rows_affected();

        let added = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, role_id
            FROM UNNEST($2::uuid[]) AS desired(role_id)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&desired)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_write_error(error, &format!("roles of user '{user_id}'")))?
        .rows_affected();

        commit(transaction).await?;

        debug!(%user_id, %guard, added, removed, "user role edges replaced");
        Ok(())
    }

    async fn list_roles_for_user(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id,
                roles.guard,
                roles.name,
                roles.display_name,
                roles.description,
                roles.is_active
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
              AND roles.guard = $2
            ORDER BY roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(guard.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles for user: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }
}

async fn begin(pool: &sqlx::PgPool) -> AppResult<Transaction<'static, Postgres>> {
    pool.begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
}

async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

fn ensure_same_guard(
    desired: &[Uuid],
    found: &[GuardedIdRow],
    guard: &str,
    kind: &str,
) -> AppResult<()> {
    if let Some(missing) = desired
        .iter()
        .find(|id| !found.iter().any(|row| row.id == **id))
    {
        return Err(AppError::NotFound(format!("{kind} '{missing}' was not found")));
    }

    if let Some(foreign) = found.iter().find(|row| row.guard != guard) {
        let foreign_guard = parse_guard(&foreign.guard, &format!("{kind} '{}'", foreign.id))?;
        return Err(AppError::InvalidState(format!(
            "{kind} '{}' belongs to guard '{foreign_guard}' and cannot be linked in guard '{guard}'",
            foreign.id
        )));
    }

    Ok(())
}
