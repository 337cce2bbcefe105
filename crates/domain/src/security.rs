use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by administrative use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when role attributes or state change.
    RoleUpdated,
    /// Emitted when a role is deactivated.
    RoleDeactivated,
    /// Emitted when a permission is created.
    PermissionCreated,
    /// Emitted when permission attributes or state change.
    PermissionUpdated,
    /// Emitted when a permission is deactivated.
    PermissionDeactivated,
    /// Emitted when a role's permission set is replaced.
    RolePermissionsReplaced,
    /// Emitted when one permission is granted to a role.
    RolePermissionGranted,
    /// Emitted when one permission is revoked from a role.
    RolePermissionRevoked,
    /// Emitted when a user's role set is replaced.
    UserRolesReplaced,
    /// Emitted when one role is attached to a user.
    UserRoleAttached,
    /// Emitted when one role is detached from a user.
    UserRoleDetached,
    /// Emitted when a super admin changes another user's role.
    UserRoleChanged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "rbac.role.created",
            Self::RoleUpdated => "rbac.role.updated",
            Self::RoleDeactivated => "rbac.role.deactivated",
            Self::PermissionCreated => "rbac.permission.created",
            Self::PermissionUpdated => "rbac.permission.updated",
            Self::PermissionDeactivated => "rbac.permission.deactivated",
            Self::RolePermissionsReplaced => "rbac.role_permissions.replaced",
            Self::RolePermissionGranted => "rbac.role_permission.granted",
            Self::RolePermissionRevoked => "rbac.role_permission.revoked",
            Self::UserRolesReplaced => "rbac.user_roles.replaced",
            Self::UserRoleAttached => "rbac.user_role.attached",
            Self::UserRoleDetached => "rbac.user_role.detached",
            Self::UserRoleChanged => "rbac.user_role.changed",
        }
    }
}
