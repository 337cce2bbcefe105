use async_trait::async_trait;

use liftgate_application::{PermissionRepository, RoleRepository, UserRepository};
use liftgate_core::{AppError, AppResult, Guard, UserId};
use liftgate_domain::{Permission, PermissionId, RbacName, Role, RoleId, User};

use super::{PermissionRow, PostgresRbacRepository, RoleRow, UserRow, map_write_error};

const ROLE_COLUMNS: &str = "id, guard, name, display_name, description, is_active";
const PERMISSION_COLUMNS: &str =
    "id, guard, name, display_name, description, category, scope, is_active";

#[async_trait]
impl UserRepository for PostgresRbacRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl RoleRepository for PostgresRbacRepository {
    async fn list_roles(&self, guard: Guard) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE guard = $1 ORDER BY name"
        ))
        .bind(guard.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"
        ))
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn find_role_by_name(&self, guard: Guard, name: &RbacName) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE guard = $1 AND name = $2"
        ))
        .bind(guard.as_str())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, guard, name, display_name, description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.guard().as_str())
        .bind(role.name().as_str())
        .bind(role.display_name().as_str())
        .bind(role.description())
        .bind(role.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, &format!("role '{}'", role.name())))?;

        Ok(())
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2,
                display_name = $3,
                description = $4,
                is_active = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.display_name().as_str())
        .bind(role.description())
        .bind(role.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, &format!("role '{}'", role.name())))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for PostgresRbacRepository {
    async fn list_permissions(&self, guard: Guard) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE guard = $1 ORDER BY name"
        ))
        .bind(guard.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1"
        ))
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?;

        row.map(Permission::try_from).transpose()
    }

    async fn find_permission_by_name(
        &self,
        guard: Guard,
        name: &RbacName,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE guard = $1 AND name = $2"
        ))
        .bind(guard.as_str())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find permission by name: {error}"))
        })?;

        row.map(Permission::try_from).transpose()
    }

    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (
                id,
                guard,
                name,
                display_name,
                description,
                category,
                scope,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.guard().as_str())
        .bind(permission.name().as_str())
        .bind(permission.display_name().as_str())
        .bind(permission.description())
        .bind(permission.category())
        .bind(permission.scope().as_str())
        .bind(permission.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(error, &format!("permission '{}'", permission.name()))
        })?;

        Ok(())
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET name = $2,
                display_name = $3,
                description = $4,
                category = $5,
                scope = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.name().as_str())
        .bind(permission.display_name().as_str())
        .bind(permission.description())
        .bind(permission.category())
        .bind(permission.scope().as_str())
        .bind(permission.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(error, &format!("permission '{}'", permission.name()))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{}' was not found",
                permission.id()
            )));
        }

        Ok(())
    }
}
