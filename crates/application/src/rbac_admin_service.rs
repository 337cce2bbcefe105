use std::sync::Arc;

use liftgate_core::{AppError, AppResult, UserId, UserIdentity};
use liftgate_domain::{AuditAction, Role, SystemRole};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, GuardContext, PermissionRepository,
    RolePermissionRegistry, RoleRepository, UserRoleAssignmentService,
};

mod assignments;
mod permissions;
mod roles;

const ROLES_VIEW: &str = "roles.view";
const ROLES_MANAGE: &str = "roles.manage";
const PERMISSIONS_VIEW: &str = "permissions.view";
const PERMISSIONS_MANAGE: &str = "permissions.manage";
const USERS_VIEW: &str = "users.view";

const ROLE_RESOURCE: &str = "rbac_role";
const PERMISSION_RESOURCE: &str = "rbac_permission";
const USER_ROLE_RESOURCE: &str = "rbac_user_role";

/// Administrative use-cases over roles, permissions and assignments.
///
/// Every operation checks the actor's capability in the guard the actor
/// authenticated with, and every mutation appends an audit event.
#[derive(Clone)]
pub struct RbacAdminService {
    authorization_service: AuthorizationService,
    guard_context: GuardContext,
    registry: RolePermissionRegistry,
    assignments: UserRoleAssignmentService,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RbacAdminService {
    /// Creates the administrative service from its collaborators.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        guard_context: GuardContext,
        registry: RolePermissionRegistry,
        assignments: UserRoleAssignmentService,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            guard_context,
            registry,
            assignments,
            roles,
            permissions,
            audit_repository,
        }
    }

    async fn require(&self, actor: &UserIdentity, permission_name: &str) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_name)
            .await
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id(),
                guard: actor.guard(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}

fn ensure_not_self(actor: &UserIdentity, target: UserId) -> AppResult<()> {
    if actor.user_id() == target {
        return Err(AppError::Forbidden(
            "users cannot change their own role assignments".to_owned(),
        ));
    }

    Ok(())
}

fn ensure_grants_editable(role: &Role) -> AppResult<()> {
    if role.system_role() == Some(SystemRole::SuperAdmin) {
        return Err(AppError::Forbidden(format!(
            "permissions of system role '{}' cannot be edited",
            role.name()
        )));
    }

    Ok(())
}
