use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use liftgate_core::{AppError, AppResult, Guard, UserId, UserIdentity};
use liftgate_domain::{Role, SystemRole};

use crate::{RolePermissionRegistry, UserRoleRepository};

/// Effective access of one user within one guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSummary {
    /// Guard the summary was computed for.
    pub guard: Guard,
    /// Names of active assigned roles.
    pub roles: BTreeSet<String>,
    /// Union of active permissions over active roles.
    pub permissions: BTreeSet<String>,
    /// Holds `admin` or `super_admin`.
    pub is_admin: bool,
    /// Holds `super_admin`.
    pub is_super_admin: bool,
    /// Holds `trainer`.
    pub is_trainer: bool,
}

/// Allow/deny decisions over the user-role and role-permission relations.
///
/// Nothing is cached: each call reads the latest committed assignments, so
/// registry and assignment mutations are visible to the next decision.
/// Denial is reported as `false`, never as an error.
#[derive(Clone)]
pub struct AuthorizationService {
    user_roles: Arc<dyn UserRoleRepository>,
    registry: RolePermissionRegistry,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(user_roles: Arc<dyn UserRoleRepository>, registry: RolePermissionRegistry) -> Self {
        Self {
            user_roles,
            registry,
        }
    }

    /// Returns the user's active roles within the guard.
    pub async fn active_roles(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>> {
        let mut roles = self
            .user_roles
            .list_roles_for_user(user_id, guard)
            .await?
            .into_iter()
            .filter(|role| role.is_active() && role.guard() == guard)
            .collect::<Vec<_>>();

        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    /// Returns the union of active permission names over the user's active roles.
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
        guard: Guard,
    ) -> AppResult<BTreeSet<String>> {
        let mut effective = BTreeSet::new();

        for role in self.active_roles(user_id, guard).await? {
            for permission in self.registry.active_permissions_of(&role).await? {
                effective.insert(permission.name().to_string());
            }
        }

        Ok(effective)
    }

    /// Returns whether the user holds an active role named `role_name` in the guard.
    pub async fn has_role(&self, user_id: UserId, guard: Guard, role_name: &str) -> AppResult<bool> {
        Ok(self
            .active_roles(user_id, guard)
            .await?
            .iter()
            .any(|role| role.name().as_str() == role_name))
    }

    /// Returns whether `permission_name` is in the user's effective permission set.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        guard: Guard,
        permission_name: &str,
    ) -> AppResult<bool> {
        Ok(self
            .effective_permissions(user_id, guard)
            .await?
            .contains(permission_name))
    }

    /// Returns whether the user holds `admin` or `super_admin`.
    pub async fn is_admin(&self, user_id: UserId, guard: Guard) -> AppResult<bool> {
        Ok(is_admin(&self.active_roles(user_id, guard).await?))
    }

    /// Returns whether the user holds `super_admin`.
    pub async fn is_super_admin(&self, user_id: UserId, guard: Guard) -> AppResult<bool> {
        Ok(holds(
            &self.active_roles(user_id, guard).await?,
            SystemRole::SuperAdmin,
        ))
    }

    /// Returns whether the user holds `trainer`.
    pub async fn is_trainer(&self, user_id: UserId, guard: Guard) -> AppResult<bool> {
        Ok(holds(
            &self.active_roles(user_id, guard).await?,
            SystemRole::Trainer,
        ))
    }

    /// Ensures the actor holds the permission in the guard they authenticated with.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        permission_name: &str,
    ) -> AppResult<()> {
        if self
            .has_permission(actor.user_id(), actor.guard(), permission_name)
            .await?
        {
            return Ok(());
        }

        debug!(
            user_id = %actor.user_id(),
            guard = %actor.guard(),
            permission = permission_name,
            "permission denied"
        );
        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{permission_name}' in guard '{}'",
            actor.user_id(),
            actor.guard()
        )))
    }

    /// Ensures the actor holds the system role in the guard they authenticated with.
    pub async fn require_role(&self, actor: &UserIdentity, role: SystemRole) -> AppResult<()> {
        if self
            .has_role(actor.user_id(), actor.guard(), role.as_str())
            .await?
        {
            return Ok(());
        }

        debug!(
            user_id = %actor.user_id(),
            guard = %actor.guard(),
            role = role.as_str(),
            "role requirement denied"
        );
        Err(AppError::Forbidden(format!(
            "user '{}' is missing role '{}' in guard '{}'",
            actor.user_id(),
            role.as_str(),
            actor.guard()
        )))
    }

    /// Computes roles, permissions and shorthands for one user in one pass.
    pub async fn access_summary(&self, user_id: UserId, guard: Guard) -> AppResult<AccessSummary> {
        let roles = self.active_roles(user_id, guard).await?;

        let mut permissions = BTreeSet::new();
        for role in &roles {
            for permission in self.registry.active_permissions_of(role).await? {
                permissions.insert(permission.name().to_string());
            }
        }

        Ok(AccessSummary {
            guard,
            is_admin: is_admin(&roles),
            is_super_admin: holds(&roles, SystemRole::SuperAdmin),
            is_trainer: holds(&roles, SystemRole::Trainer),
            roles: roles.iter().map(|role| role.name().to_string()).collect(),
            permissions,
        })
    }
}

fn holds(roles: &[Role], system_role: SystemRole) -> bool {
    roles
        .iter()
        .any(|role| role.name().as_str() == system_role.as_str())
}

fn is_admin(roles: &[Role]) -> bool {
    holds(roles, SystemRole::Admin) || holds(roles, SystemRole::SuperAdmin)
}
