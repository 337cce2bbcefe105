use liftgate_core::Guard;
use liftgate_domain::PermissionScope;

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Guard the role is created in.
    pub guard: Guard,
    /// Machine name, unique within the guard.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial update for an existing role. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New machine name.
    pub name: Option<String>,
    /// New label.
    pub display_name: Option<String>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
    /// Target lifecycle state.
    pub is_active: Option<bool>,
}

/// Input payload for creating permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Guard the permission is created in.
    pub guard: Guard,
    /// Machine name, unique within the guard.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional grouping category.
    pub category: Option<String>,
    /// Resource reach.
    pub scope: PermissionScope,
}

/// Partial update for an existing permission. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePermissionInput {
    /// New machine name.
    pub name: Option<String>,
    /// New label.
    pub display_name: Option<String>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
    /// New category; an empty string clears it.
    pub category: Option<String>,
    /// New scope.
    pub scope: Option<PermissionScope>,
    /// Target lifecycle state.
    pub is_active: Option<bool>,
}
