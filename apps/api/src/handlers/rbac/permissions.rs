use super::*;

use liftgate_application::UpdatePermissionInput;

use crate::dto::{CreatePermissionRequest, UpdatePermissionRequest};

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<GuardQuery>,
) -> ApiResult<Envelope<Vec<PermissionResponse>>> {
    let guard = resolve_guard(query.guard.as_deref(), &user)?;
    let permissions = state
        .rbac_admin_service
        .list_permissions(&user, guard)
        .await?;

    Ok(envelope(
        permissions_response(permissions),
        "Permissions retrieved",
    ))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Envelope<PermissionResponse>)> {
    let guard = resolve_guard(payload.guard.as_deref(), &user)?;
    let permission = state
        .rbac_admin_service
        .create_permission(&user, payload.into_input(guard)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        envelope(PermissionResponse::from(permission), "Permission created"),
    ))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission): Path<String>,
    ApiJson(payload): ApiJson<UpdatePermissionRequest>,
) -> ApiResult<Envelope<PermissionResponse>> {
    let permission_id = permission_id(&permission)?;
    let permission = state
        .rbac_admin_service
        .update_permission(&user, permission_id, UpdatePermissionInput::try_from(payload)?)
        .await?;

    Ok(envelope(
        PermissionResponse::from(permission),
        "Permission updated",
    ))
}

pub async fn deactivate_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission): Path<String>,
) -> ApiResult<Envelope<PermissionResponse>> {
    let permission = state
        .rbac_admin_service
        .deactivate_permission(&user, permission_id(&permission)?)
        .await?;

    Ok(envelope(
        PermissionResponse::from(permission),
        "Permission deactivated",
    ))
}
