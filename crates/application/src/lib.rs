//! Application services and ports.

#![forbid(unsafe_code)]

mod api_token_service;
mod authorization_service;
mod catalog_bootstrap_service;
mod guard_context;
mod rbac_admin_service;
mod rbac_ports;
mod role_permission_registry;
mod user_role_assignment_service;

#[cfg(test)]
mod test_fakes;

pub use api_token_service::{ApiTokenService, hash_api_token};
pub use authorization_service::{AccessSummary, AuthorizationService};
pub use catalog_bootstrap_service::{CatalogBootstrapReport, CatalogBootstrapService};
pub use guard_context::GuardContext;
pub use rbac_admin_service::RbacAdminService;
pub use rbac_ports::{
    ApiTokenRepository, AuditEvent, AuditRepository, CreatePermissionInput, CreateRoleInput,
    GuardIntegrityIssue, GuardIntegrityRepository, PermissionRepository,
    RolePermissionRepository, RoleRepository, UpdatePermissionInput, UpdateRoleInput,
    UserRepository, UserRoleRepository,
};
pub use role_permission_registry::RolePermissionRegistry;
pub use user_role_assignment_service::UserRoleAssignmentService;
