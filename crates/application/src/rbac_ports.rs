mod audit;
mod inputs;
mod integrity;
mod repositories;

pub use audit::{AuditEvent, AuditRepository};
pub use inputs::{CreatePermissionInput, CreateRoleInput, UpdatePermissionInput, UpdateRoleInput};
pub use integrity::GuardIntegrityIssue;
pub use repositories::{
    ApiTokenRepository, GuardIntegrityRepository, PermissionRepository, RolePermissionRepository,
    RoleRepository, UserRepository, UserRoleRepository,
};
