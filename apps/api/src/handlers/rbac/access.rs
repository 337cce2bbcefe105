use super::*;

use crate::dto::AccessSummaryResponse;

pub async fn my_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Envelope<AccessSummaryResponse>> {
    let summary = state.rbac_admin_service.my_access(&user).await?;

    Ok(envelope(
        AccessSummaryResponse::new(user.user_id(), user.display_name(), summary),
        "Access retrieved",
    ))
}
