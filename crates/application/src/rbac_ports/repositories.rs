use std::collections::BTreeSet;

use async_trait::async_trait;

use liftgate_core::{AppResult, Guard, UserId};
use liftgate_domain::{Permission, PermissionId, RbacName, Role, RoleId, User};

use super::integrity::GuardIntegrityIssue;

/// Repository port for user lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;
}

/// Repository port for role records.
///
/// Name lookups always take a guard; there is no guard-less lookup.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every role of a guard, active or not, ordered by name.
    async fn list_roles(&self, guard: Guard) -> AppResult<Vec<Role>>;

    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by name within one guard.
    async fn find_role_by_name(&self, guard: Guard, name: &RbacName) -> AppResult<Option<Role>>;

    /// Persists a new role. Fails with `Validation` when the name is taken in the guard.
    async fn insert_role(&self, role: Role) -> AppResult<()>;

    /// Persists changes to an existing role.
    async fn update_role(&self, role: Role) -> AppResult<()>;
}

/// Repository port for permission records.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists every permission of a guard, active or not, ordered by name.
    async fn list_permissions(&self, guard: Guard) -> AppResult<Vec<Permission>>;

    /// Finds a permission by id.
    async fn find_permission(&self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Finds a permission by name within one guard.
    async fn find_permission_by_name(
        &self,
        guard: Guard,
        name: &RbacName,
    ) -> AppResult<Option<Permission>>;

    /// Persists a new permission. Fails with `Validation` when the name is taken in the guard.
    async fn insert_permission(&self, permission: Permission) -> AppResult<()>;

    /// Persists changes to an existing permission.
    async fn update_permission(&self, permission: Permission) -> AppResult<()>;
}

/// Repository port for role-to-permission edges.
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Adds one edge. Existing edges are left untouched.
    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId)
    -> AppResult<()>;

    /// Removes one edge. Missing edges are ignored.
    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Atomically sets the role's edges to exactly `permission_ids`.
    ///
    /// Readers observe either the previous or the new complete set.
    async fn replace_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<()>;

    /// Lists every permission linked to a role, active or not.
    async fn list_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;
}

/// Repository port for user-to-role edges.
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Adds one edge. Existing edges are left untouched.
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Removes one edge. Missing edges are ignored.
    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Atomically sets the user's roles within `guard` to exactly `role_ids`.
    ///
    /// Assignments in other guards are left untouched.
    async fn replace_roles(
        &self,
        user_id: UserId,
        guard: Guard,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<()>;

    /// Lists every role assigned to a user within one guard, active or not.
    async fn list_roles_for_user(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>>;
}

/// Repository port for guard consistency checks.
#[async_trait]
pub trait GuardIntegrityRepository: Send + Sync {
    /// Lists every guard consistency problem found in storage.
    async fn find_guard_integrity_issues(&self) -> AppResult<Vec<GuardIntegrityIssue>>;
}

/// Repository port for bearer token resolution.
#[async_trait]
pub trait ApiTokenRepository: Send + Sync {
    /// Finds the user owning an unrevoked token with the given SHA-256 hex digest.
    async fn find_user_by_token_hash(&self, token_hash: &str) -> AppResult<Option<User>>;
}
