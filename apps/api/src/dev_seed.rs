use liftgate_application::{GuardContext, UserRoleRepository};
use liftgate_core::{AppResult, Guard, NonEmptyString, UserId};
use liftgate_domain::{EmailAddress, SystemRole, User};
use liftgate_infrastructure::InMemoryRbacStore;
use tracing::info;

const DEV_OWNER_EMAIL: &str = "owner@liftgate.local";
const DEV_OWNER_DISPLAY_NAME: &str = "Gym Owner";

/// Seeds an in-memory owner holding `super_admin` in the api guard and
/// reachable with `raw_token`.
pub async fn seed_dev_owner(
    store: &InMemoryRbacStore,
    guard_context: &GuardContext,
    raw_token: &str,
) -> AppResult<UserId> {
    let user_id = UserId::new();
    store
        .insert_user(User::new(
            user_id,
            EmailAddress::new(DEV_OWNER_EMAIL)?,
            NonEmptyString::new(DEV_OWNER_DISPLAY_NAME)?,
            None,
        ))
        .await?;

    let role = guard_context
        .resolve_role(SystemRole::SuperAdmin.as_str(), Guard::Api)
        .await?;
    store.attach_role(user_id, role.id()).await?;
    store.register_api_token(raw_token, user_id).await?;

    info!(%user_id, email = DEV_OWNER_EMAIL, "seeded development owner for the api guard");
    Ok(user_id)
}
