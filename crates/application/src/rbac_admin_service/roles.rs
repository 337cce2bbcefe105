use std::collections::BTreeSet;

use liftgate_core::{AppError, AppResult, Guard, NonEmptyString, UserIdentity};
use liftgate_domain::{AuditAction, Permission, PermissionId, RbacName, Role, RoleId};

use super::{
    ROLE_RESOURCE, ROLES_MANAGE, ROLES_VIEW, RbacAdminService, ensure_grants_editable,
};
use crate::{CreateRoleInput, UpdateRoleInput};

impl RbacAdminService {
    /// Lists every role of a guard, including deactivated ones.
    pub async fn list_roles(&self, actor: &UserIdentity, guard: Guard) -> AppResult<Vec<Role>> {
        self.require(actor, ROLES_VIEW).await?;
        self.roles.list_roles(guard).await
    }

    /// Returns one role.
    pub async fn get_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<Role> {
        self.require(actor, ROLES_VIEW).await?;
        self.guard_context.role(role_id).await
    }

    /// Creates a role in the input guard and emits an audit event.
    pub async fn create_role(&self, actor: &UserIdentity, input: CreateRoleInput) -> AppResult<Role> {
        self.require(actor, ROLES_MANAGE).await?;

        let name = RbacName::new(input.name)?;
        let display_name = NonEmptyString::new(input.display_name)?;
        self.ensure_role_name_free(input.guard, &name, None).await?;

        let role = Role::new(
            RoleId::new(),
            input.guard,
            name,
            display_name,
            input.description,
        );
        self.roles.insert_role(role.clone()).await?;

        self.audit(
            actor,
            AuditAction::RoleCreated,
            ROLE_RESOURCE,
            role.id().to_string(),
            format!("created role '{}' in guard '{}'", role.name(), role.guard()),
        )
        .await?;

        Ok(role)
    }

    /// Applies a partial update to a role and emits an audit event.
    ///
    /// Setting `is_active` to `true` reactivates a deactivated role.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.require(actor, ROLES_MANAGE).await?;

        let mut role = self.guard_context.role(role_id).await?;

        if let Some(name) = input.name {
            let name = RbacName::new(name)?;
            self.ensure_role_name_free(role.guard(), &name, Some(role_id))
                .await?;
            role.rename(name)?;
        }

        let display_name = input.display_name.map(NonEmptyString::new).transpose()?;
        if display_name.is_some() || input.description.is_some() {
            role.update_details(display_name, input.description)?;
        }

        match input.is_active {
            Some(true) if !role.is_active() => role.activate()?,
            Some(false) if role.is_active() => role.deactivate()?,
            _ => {}
        }

        self.roles.update_role(role.clone()).await?;

        self.audit(
            actor,
            AuditAction::RoleUpdated,
            ROLE_RESOURCE,
            role.id().to_string(),
            format!("updated role '{}' ({})", role.name(), role.state().as_str()),
        )
        .await?;

        Ok(role)
    }

    /// Deactivates a role and emits an audit event.
    pub async fn deactivate_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<Role> {
        self.require(actor, ROLES_MANAGE).await?;

        let role = self.assignments.deactivate_role(role_id).await?;

        self.audit(
            actor,
            AuditAction::RoleDeactivated,
            ROLE_RESOURCE,
            role.id().to_string(),
            format!("deactivated role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Returns the role's active permissions.
    pub async fn role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<Permission>> {
        self.require(actor, ROLES_VIEW).await?;
        self.registry.permissions_of(role_id).await
    }

    /// Sets the role's permissions to exactly `permission_ids` and emits an audit event.
    pub async fn replace_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        self.require(actor, ROLES_MANAGE).await?;
        ensure_grants_editable(&self.guard_context.role(role_id).await?)?;

        let role = self
            .registry
            .replace_permissions(role_id, permission_ids)
            .await?;

        self.audit(
            actor,
            AuditAction::RolePermissionsReplaced,
            ROLE_RESOURCE,
            role.id().to_string(),
            format!(
                "replaced permissions of role '{}' with {} permission(s)",
                role.name(),
                permission_ids.iter().collect::<BTreeSet<_>>().len()
            ),
        )
        .await?;

        self.registry.permissions_of(role_id).await
    }

    /// Grants one permission to a role and emits an audit event.
    pub async fn grant_role_permission(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require(actor, ROLES_MANAGE).await?;
        let role = self.guard_context.role(role_id).await?;
        ensure_grants_editable(&role)?;

        self.registry.grant(role_id, permission_id).await?;

        self.audit(
            actor,
            AuditAction::RolePermissionGranted,
            ROLE_RESOURCE,
            format!("{role_id}:{permission_id}"),
            format!("granted permission '{permission_id}' to role '{}'", role.name()),
        )
        .await
    }

    /// Revokes one permission from a role and emits an audit event.
    pub async fn revoke_role_permission(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require(actor, ROLES_MANAGE).await?;
        let role = self.guard_context.role(role_id).await?;
        ensure_grants_editable(&role)?;

        self.registry.revoke(role_id, permission_id).await?;

        self.audit(
            actor,
            AuditAction::RolePermissionRevoked,
            ROLE_RESOURCE,
            format!("{role_id}:{permission_id}"),
            format!(
                "revoked permission '{permission_id}' from role '{}'",
                role.name()
            ),
        )
        .await
    }

    async fn ensure_role_name_free(
        &self,
        guard: Guard,
        name: &RbacName,
        except: Option<RoleId>,
    ) -> AppResult<()> {
        match self.roles.find_role_by_name(guard, name).await? {
            Some(existing) if Some(existing.id()) != except => Err(AppError::Validation(format!(
                "role '{name}' already exists in guard '{guard}'"
            ))),
            _ => Ok(()),
        }
    }
}
