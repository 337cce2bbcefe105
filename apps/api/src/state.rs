use liftgate_application::{ApiTokenService, AuthorizationService, RbacAdminService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rbac_admin_service: RbacAdminService,
    pub authorization_service: AuthorizationService,
    pub api_token_service: ApiTokenService,
}
