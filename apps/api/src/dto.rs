mod common;
mod rbac;

pub use common::{GuardQuery, HealthResponse, SuccessResponse, parse_id, resolve_guard};
pub use rbac::{
    AccessSummaryResponse, ChangeRoleRequest, CreatePermissionRequest, CreateRoleRequest,
    PermissionResponse, ReplaceRolePermissionsRequest, ReplaceUserRolesRequest, RoleResponse,
    UpdatePermissionRequest, UpdateRoleRequest, UserPermissionsResponse,
};
