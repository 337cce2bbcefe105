use std::fmt::{Display, Formatter};

/// Guard consistency problem found in persisted RBAC rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardIntegrityIssue {
    /// A role row carries a guard value outside the known set.
    UnknownRoleGuard {
        /// Role identifier.
        role_id: String,
        /// Role name.
        role_name: String,
        /// Stored guard value.
        guard: String,
    },
    /// A permission row carries a guard value outside the known set.
    UnknownPermissionGuard {
        /// Permission identifier.
        permission_id: String,
        /// Permission name.
        permission_name: String,
        /// Stored guard value.
        guard: String,
    },
    /// A role is linked to a permission of another guard.
    CrossGuardGrant {
        /// Role name.
        role_name: String,
        /// Role guard value.
        role_guard: String,
        /// Permission name.
        permission_name: String,
        /// Permission guard value.
        permission_guard: String,
    },
}

impl Display for GuardIntegrityIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoleGuard {
                role_id,
                role_name,
                guard,
            } => write!(
                formatter,
                "role '{role_name}' ({role_id}) has unknown guard '{guard}'"
            ),
            Self::UnknownPermissionGuard {
                permission_id,
                permission_name,
                guard,
            } => write!(
                formatter,
                "permission '{permission_name}' ({permission_id}) has unknown guard '{guard}'"
            ),
            Self::CrossGuardGrant {
                role_name,
                role_guard,
                permission_name,
                permission_guard,
            } => write!(
                formatter,
                "role '{role_name}' ({role_guard}) is granted permission '{permission_name}' ({permission_guard})"
            ),
        }
    }
}
