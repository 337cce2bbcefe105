use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use liftgate_core::{UserId, UserIdentity};
use liftgate_domain::{PermissionId, RoleId};

use crate::dto::{
    GuardQuery, PermissionResponse, RoleResponse, SuccessResponse, parse_id, resolve_guard,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

mod access;
mod permissions;
mod roles;
mod users;

pub use access::my_access_handler;
pub use permissions::{
    create_permission_handler, deactivate_permission_handler, list_permissions_handler,
    update_permission_handler,
};
pub use roles::{
    create_role_handler, deactivate_role_handler, grant_role_permission_handler,
    list_role_permissions_handler, list_roles_handler, replace_role_permissions_handler,
    revoke_role_permission_handler, update_role_handler,
};
pub use users::{
    attach_user_role_handler, change_user_role_handler, detach_user_role_handler,
    list_user_permissions_handler, list_user_roles_handler, replace_user_roles_handler,
};

type Envelope<T> = Json<SuccessResponse<T>>;

fn envelope<T>(data: T, message: &str) -> Envelope<T> {
    Json(SuccessResponse::new(data, message))
}

fn role_id(value: &str) -> ApiResult<RoleId> {
    Ok(parse_id(value, "role", RoleId::from_uuid)?)
}

fn permission_id(value: &str) -> ApiResult<PermissionId> {
    Ok(parse_id(value, "permission", PermissionId::from_uuid)?)
}

fn user_id(value: &str) -> ApiResult<UserId> {
    Ok(parse_id(value, "user", UserId::from_uuid)?)
}

fn roles_response(roles: Vec<liftgate_domain::Role>) -> Vec<RoleResponse> {
    roles.into_iter().map(RoleResponse::from).collect()
}

fn permissions_response(permissions: Vec<liftgate_domain::Permission>) -> Vec<PermissionResponse> {
    permissions
        .into_iter()
        .map(PermissionResponse::from)
        .collect()
}
