//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod lifecycle;
mod name;
mod permission;
mod role;
mod security;
mod user;

pub use catalog::{CatalogPermission, permission_catalog};
pub use lifecycle::LifecycleState;
pub use name::{RBAC_NAME_MAX_LENGTH, RbacName};
pub use permission::{Permission, PermissionId, PermissionScope};
pub use role::{Role, RoleId, SystemRole};
pub use security::AuditAction;
pub use user::{EmailAddress, User};
