use super::*;

use crate::dto::{CreateRoleRequest, ReplaceRolePermissionsRequest, UpdateRoleRequest};

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<GuardQuery>,
) -> ApiResult<Envelope<Vec<RoleResponse>>> {
    let guard = resolve_guard(query.guard.as_deref(), &user)?;
    let roles = state.rbac_admin_service.list_roles(&user, guard).await?;

    Ok(envelope(roles_response(roles), "Roles retrieved"))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Envelope<RoleResponse>)> {
    let guard = resolve_guard(payload.guard.as_deref(), &user)?;
    let role = state
        .rbac_admin_service
        .create_role(&user, payload.into_input(guard))
        .await?;

    Ok((
        StatusCode::CREATED,
        envelope(RoleResponse::from(role), "Role created"),
    ))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role): Path<String>,
    ApiJson(payload): ApiJson<UpdateRoleRequest>,
) -> ApiResult<Envelope<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .update_role(&user, role_id(&role)?, payload.into())
        .await?;

    Ok(envelope(RoleResponse::from(role), "Role updated"))
}

pub async fn deactivate_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role): Path<String>,
) -> ApiResult<Envelope<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .deactivate_role(&user, role_id(&role)?)
        .await?;

    Ok(envelope(RoleResponse::from(role), "Role deactivated"))
}

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role): Path<String>,
) -> ApiResult<Envelope<Vec<PermissionResponse>>> {
    let permissions = state
        .rbac_admin_service
        .role_permissions(&user, role_id(&role)?)
        .await?;

    Ok(envelope(
        permissions_response(permissions),
        "Role permissions retrieved",
    ))
}

pub async fn replace_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role): Path<String>,
    ApiJson(payload): ApiJson<ReplaceRolePermissionsRequest>,
) -> ApiResult<Envelope<Vec<PermissionResponse>>> {
    let role_id = role_id(&role)?;
    let permission_ids = payload
        .permission_ids
        .iter()
        .map(|value| permission_id(value))
        .collect::<ApiResult<Vec<_>>>()?;

    let permissions = state
        .rbac_admin_service
        .replace_role_permissions(&user, role_id, &permission_ids)
        .await?;

    Ok(envelope(
        permissions_response(permissions),
        "Role permissions replaced",
    ))
}

pub async fn grant_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role, permission)): Path<(String, String)>,
) -> ApiResult<Envelope<Vec<PermissionResponse>>> {
    let role_id = role_id(&role)?;
    state
        .rbac_admin_service
        .grant_role_permission(&user, role_id, permission_id(&permission)?)
        .await?;

    let permissions = state
        .rbac_admin_service
        .role_permissions(&user, role_id)
        .await?;
    Ok(envelope(
        permissions_response(permissions),
        "Permission granted",
    ))
}

pub async fn revoke_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role, permission)): Path<(String, String)>,
) -> ApiResult<Envelope<Vec<PermissionResponse>>> {
    let role_id = role_id(&role)?;
    state
        .rbac_admin_service
        .revoke_role_permission(&user, role_id, permission_id(&permission)?)
        .await?;

    let permissions = state
        .rbac_admin_service
        .role_permissions(&user, role_id)
        .await?;
    Ok(envelope(
        permissions_response(permissions),
        "Permission revoked",
    ))
}
