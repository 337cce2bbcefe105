use std::sync::Arc;

use liftgate_application::{
    ApiTokenRepository, ApiTokenService, AuditRepository, AuthorizationService,
    CatalogBootstrapService, GuardContext, GuardIntegrityRepository, PermissionRepository,
    RbacAdminService, RolePermissionRegistry, RolePermissionRepository, RoleRepository,
    UserRepository, UserRoleAssignmentService, UserRoleRepository,
};
use liftgate_infrastructure::{
    InMemoryRbacStore, PostgresApiTokenRepository, PostgresAuditRepository,
    PostgresRbacRepository,
};
use sqlx::PgPool;

use crate::state::AppState;

/// Port implementations for one storage backend.
pub struct RbacRepositories {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    role_permissions: Arc<dyn RolePermissionRepository>,
    user_roles: Arc<dyn UserRoleRepository>,
    integrity: Arc<dyn GuardIntegrityRepository>,
    audit: Arc<dyn AuditRepository>,
    api_tokens: Arc<dyn ApiTokenRepository>,
}

impl RbacRepositories {
    pub fn postgres(pool: &PgPool) -> Self {
        let rbac = Arc::new(PostgresRbacRepository::new(pool.clone()));

        Self {
            users: rbac.clone(),
            roles: rbac.clone(),
            permissions: rbac.clone(),
            role_permissions: rbac.clone(),
            user_roles: rbac.clone(),
            integrity: rbac,
            audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
            api_tokens: Arc::new(PostgresApiTokenRepository::new(pool.clone())),
        }
    }

    pub fn in_memory(store: Arc<InMemoryRbacStore>) -> Self {
        Self {
            users: store.clone(),
            roles: store.clone(),
            permissions: store.clone(),
            role_permissions: store.clone(),
            user_roles: store.clone(),
            integrity: store.clone(),
            audit: store.clone(),
            api_tokens: store,
        }
    }
}

/// Services the composition root needs beyond the request state.
pub struct RbacServices {
    pub app_state: AppState,
    pub guard_context: GuardContext,
    pub catalog_bootstrap_service: CatalogBootstrapService,
}

pub fn build_services(repositories: RbacRepositories) -> RbacServices {
    let guard_context = GuardContext::new(
        repositories.roles.clone(),
        repositories.permissions.clone(),
        repositories.integrity,
    );
    let registry =
        RolePermissionRegistry::new(guard_context.clone(), repositories.role_permissions);
    let authorization_service =
        AuthorizationService::new(repositories.user_roles.clone(), registry.clone());
    let assignments = UserRoleAssignmentService::new(
        guard_context.clone(),
        authorization_service.clone(),
        repositories.users,
        repositories.roles.clone(),
        repositories.user_roles,
    );
    let catalog_bootstrap_service = CatalogBootstrapService::new(
        repositories.roles.clone(),
        repositories.permissions.clone(),
        registry.clone(),
    );

    let rbac_admin_service = RbacAdminService::new(
        authorization_service.clone(),
        guard_context.clone(),
        registry,
        assignments,
        repositories.roles,
        repositories.permissions,
        repositories.audit,
    );

    RbacServices {
        app_state: AppState {
            rbac_admin_service,
            authorization_service,
            api_token_service: ApiTokenService::new(repositories.api_tokens),
        },
        guard_context,
        catalog_bootstrap_service,
    }
}
