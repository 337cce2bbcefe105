use super::*;

use crate::dto::{ChangeRoleRequest, ReplaceUserRolesRequest, UserPermissionsResponse};

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(target): Path<String>,
    Query(query): Query<GuardQuery>,
) -> ApiResult<Envelope<Vec<RoleResponse>>> {
    let guard = resolve_guard(query.guard.as_deref(), &user)?;
    let roles = state
        .rbac_admin_service
        .user_roles(&user, user_id(&target)?, guard)
        .await?;

    Ok(envelope(roles_response(roles), "User roles retrieved"))
}

pub async fn replace_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(target): Path<String>,
    ApiJson(payload): ApiJson<ReplaceUserRolesRequest>,
) -> ApiResult<Envelope<Vec<RoleResponse>>> {
    let target = user_id(&target)?;
    let guard = resolve_guard(payload.guard.as_deref(), &user)?;
    let role_ids = payload
        .role_ids
        .iter()
        .map(|value| role_id(value))
        .collect::<ApiResult<Vec<_>>>()?;

    let roles = state
        .rbac_admin_service
        .replace_user_roles(&user, target, guard, &role_ids)
        .await?;

    Ok(envelope(roles_response(roles), "User roles replaced"))
}

pub async fn attach_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((target, role)): Path<(String, String)>,
) -> ApiResult<Envelope<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .attach_user_role(&user, user_id(&target)?, role_id(&role)?)
        .await?;

    Ok(envelope(RoleResponse::from(role), "Role attached"))
}

pub async fn detach_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((target, role)): Path<(String, String)>,
) -> ApiResult<Envelope<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .detach_user_role(&user, user_id(&target)?, role_id(&role)?)
        .await?;

    Ok(envelope(RoleResponse::from(role), "Role detached"))
}

pub async fn change_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(target): Path<String>,
    ApiJson(payload): ApiJson<ChangeRoleRequest>,
) -> ApiResult<Envelope<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .change_user_role(&user, user_id(&target)?, payload.role.as_str())
        .await?;

    Ok(envelope(RoleResponse::from(role), "User role changed"))
}

pub async fn list_user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(target): Path<String>,
    Query(query): Query<GuardQuery>,
) -> ApiResult<Envelope<UserPermissionsResponse>> {
    let target = user_id(&target)?;
    let guard = resolve_guard(query.guard.as_deref(), &user)?;
    let permissions = state
        .rbac_admin_service
        .user_permissions(&user, target, guard)
        .await?;

    Ok(envelope(
        UserPermissionsResponse::new(target, guard, permissions),
        "User permissions retrieved",
    ))
}
