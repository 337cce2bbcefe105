use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use liftgate_core::AppResult;
use liftgate_domain::{Permission, PermissionId, Role, RoleId};

use crate::{GuardContext, RolePermissionRepository};

/// Resolves and mutates which permissions belong to which role.
#[derive(Clone)]
pub struct RolePermissionRegistry {
    guard_context: GuardContext,
    repository: Arc<dyn RolePermissionRepository>,
}

impl RolePermissionRegistry {
    /// Creates a registry from its collaborators.
    #[must_use]
    pub fn new(guard_context: GuardContext, repository: Arc<dyn RolePermissionRepository>) -> Self {
        Self {
            guard_context,
            repository,
        }
    }

    /// Grants one permission to a role. Granting twice is a no-op.
    pub async fn grant(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<()> {
        let (role, permission) = self.resolve_edge(role_id, permission_id).await?;

        self.repository
            .grant_permission(role_id, permission_id)
            .await?;

        info!(
            role = %role.name(),
            permission = %permission.name(),
            guard = %role.guard(),
            "permission granted to role"
        );
        Ok(())
    }

    /// Revokes one permission from a role. Revoking a missing edge is a no-op.
    pub async fn revoke(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<()> {
        let (role, permission) = self.resolve_edge(role_id, permission_id).await?;

        self.repository
            .revoke_permission(role_id, permission_id)
            .await?;

        info!(
            role = %role.name(),
            permission = %permission.name(),
            guard = %role.guard(),
            "permission revoked from role"
        );
        Ok(())
    }

    /// Sets the role's permissions to exactly `permission_ids`.
    ///
    /// Every id is resolved and guard-checked before anything is written;
    /// the write itself is one atomic diff-and-apply.
    pub async fn replace_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<Role> {
        let role = self.guard_context.role(role_id).await?;

        let mut desired = BTreeSet::new();
        for permission_id in permission_ids {
            if !desired.insert(*permission_id) {
                continue;
            }

            let permission = self.guard_context.permission(*permission_id).await?;
            permission.ensure_guard(role.guard())?;
        }

        self.repository
            .replace_permissions(role_id, &desired)
            .await?;

        info!(
            role = %role.name(),
            guard = %role.guard(),
            permission_count = desired.len(),
            "role permissions replaced"
        );
        Ok(role)
    }

    /// Returns the role's active permissions ordered by name.
    pub async fn permissions_of(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let role = self.guard_context.role(role_id).await?;
        self.active_permissions_of(&role).await
    }

    pub(crate) async fn active_permissions_of(&self, role: &Role) -> AppResult<Vec<Permission>> {
        let mut permissions = self
            .repository
            .list_permissions_for_role(role.id())
            .await?
            .into_iter()
            .filter(|permission| permission.is_active() && permission.guard() == role.guard())
            .collect::<Vec<_>>();

        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn resolve_edge(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<(Role, Permission)> {
        let role = self.guard_context.role(role_id).await?;
        let permission = self.guard_context.permission(permission_id).await?;
        permission.ensure_guard(role.guard())?;

        Ok((role, permission))
    }
}
