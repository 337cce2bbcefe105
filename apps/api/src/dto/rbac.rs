use std::collections::BTreeSet;
use std::str::FromStr;

use liftgate_application::{
    AccessSummary, CreatePermissionInput, CreateRoleInput, UpdatePermissionInput, UpdateRoleInput,
};
use liftgate_core::{AppResult, Guard, UserId};
use liftgate_domain::{Permission, PermissionScope, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub guard: Option<String>,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

impl CreateRoleRequest {
    pub fn into_input(self, guard: Guard) -> CreateRoleInput {
        CreateRoleInput {
            guard,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
        }
    }
}

/// Incoming payload for role updates. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(value: UpdateRoleRequest) -> Self {
        Self {
            name: value.name,
            display_name: value.display_name,
            description: value.description,
            is_active: value.is_active,
        }
    }
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub guard: Option<String>,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub scope: Option<String>,
}

impl CreatePermissionRequest {
    pub fn into_input(self, guard: Guard) -> AppResult<CreatePermissionInput> {
        let scope = self
            .scope
            .as_deref()
            .map(PermissionScope::from_str)
            .transpose()?
            .unwrap_or(PermissionScope::Global);

        Ok(CreatePermissionInput {
            guard,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            category: self.category,
            scope,
        })
    }
}

/// Incoming payload for permission updates. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-permission-request.ts"
)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub scope: Option<String>,
    pub is_active: Option<bool>,
}

impl TryFrom<UpdatePermissionRequest> for UpdatePermissionInput {
    type Error = liftgate_core::AppError;

    fn try_from(value: UpdatePermissionRequest) -> AppResult<Self> {
        Ok(Self {
            name: value.name,
            display_name: value.display_name,
            description: value.description,
            category: value.category,
            scope: value
                .scope
                .as_deref()
                .map(PermissionScope::from_str)
                .transpose()?,
            is_active: value.is_active,
        })
    }
}

/// Full replacement of a role's permission set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/replace-role-permissions-request.ts"
)]
pub struct ReplaceRolePermissionsRequest {
    pub permission_ids: Vec<String>,
}

/// Full replacement of a user's roles within one guard.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/replace-user-roles-request.ts"
)]
pub struct ReplaceUserRolesRequest {
    pub guard: Option<String>,
    pub role_ids: Vec<String>,
}

/// Moves a user onto exactly one named role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/change-role-request.ts"
)]
pub struct ChangeRoleRequest {
    pub role: String,
}

/// API representation of an RBAC role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub guard: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub state: String,
    pub is_active: bool,
    pub is_protected: bool,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id().to_string(),
            guard: value.guard().as_str().to_owned(),
            name: value.name().as_str().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            description: value.description().map(str::to_owned),
            state: value.state().as_str().to_owned(),
            is_active: value.is_active(),
            is_protected: value.is_protected(),
        }
    }
}

/// API representation of an RBAC permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub guard: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub scope: String,
    pub state: String,
    pub is_active: bool,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.id().to_string(),
            guard: value.guard().as_str().to_owned(),
            name: value.name().as_str().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            description: value.description().map(str::to_owned),
            category: value.category().map(str::to_owned),
            scope: value.scope().as_str().to_owned(),
            state: value.state().as_str().to_owned(),
            is_active: value.is_active(),
        }
    }
}

/// Effective permission names of one user in one guard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-permissions-response.ts"
)]
pub struct UserPermissionsResponse {
    pub user_id: String,
    pub guard: String,
    pub permissions: Vec<String>,
}

impl UserPermissionsResponse {
    pub fn new(user_id: UserId, guard: Guard, permissions: BTreeSet<String>) -> Self {
        Self {
            user_id: user_id.to_string(),
            guard: guard.as_str().to_owned(),
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// Caller's own roles, permissions and role shorthands.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-summary-response.ts"
)]
pub struct AccessSummaryResponse {
    pub user_id: String,
    pub display_name: String,
    pub guard: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub is_trainer: bool,
}

impl AccessSummaryResponse {
    pub fn new(user_id: UserId, display_name: &str, summary: AccessSummary) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.to_owned(),
            guard: summary.guard.as_str().to_owned(),
            roles: summary.roles.into_iter().collect(),
            permissions: summary.permissions.into_iter().collect(),
            is_admin: summary.is_admin,
            is_super_admin: summary.is_super_admin,
            is_trainer: summary.is_trainer,
        }
    }
}
