use liftgate_core::{AppError, AppResult, Guard, NonEmptyString, UserIdentity};
use liftgate_domain::{AuditAction, Permission, PermissionId, RbacName};

use super::{PERMISSION_RESOURCE, PERMISSIONS_MANAGE, PERMISSIONS_VIEW, RbacAdminService};
use crate::{CreatePermissionInput, UpdatePermissionInput};

impl RbacAdminService {
    /// Lists every permission of a guard, including deactivated ones.
    pub async fn list_permissions(
        &self,
        actor: &UserIdentity,
        guard: Guard,
    ) -> AppResult<Vec<Permission>> {
        self.require(actor, PERMISSIONS_VIEW).await?;
        self.permissions.list_permissions(guard).await
    }

    /// Creates a permission in the input guard and emits an audit event.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        self.require(actor, PERMISSIONS_MANAGE).await?;

        let name = RbacName::new(input.name)?;
        let display_name = NonEmptyString::new(input.display_name)?;
        self.ensure_permission_name_free(input.guard, &name, None)
            .await?;

        let permission = Permission::new(
            PermissionId::new(),
            input.guard,
            name,
            display_name,
            input.category,
            input.scope,
        )
        .with_description(input.description);
        self.permissions
            .insert_permission(permission.clone())
            .await?;

        self.audit(
            actor,
            AuditAction::PermissionCreated,
            PERMISSION_RESOURCE,
            permission.id().to_string(),
            format!(
                "created permission '{}' in guard '{}'",
                permission.name(),
                permission.guard()
            ),
        )
        .await?;

        Ok(permission)
    }

    /// Applies a partial update to a permission and emits an audit event.
    pub async fn update_permission(
        &self,
        actor: &UserIdentity,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        self.require(actor, PERMISSIONS_MANAGE).await?;

        let mut permission = self.guard_context.permission(permission_id).await?;

        if let Some(name) = input.name {
            let name = RbacName::new(name)?;
            self.ensure_permission_name_free(permission.guard(), &name, Some(permission_id))
                .await?;
            permission.rename(name);
        }

        let display_name = input.display_name.map(NonEmptyString::new).transpose()?;
        permission.update_details(display_name, input.description, input.category, input.scope);

        match input.is_active {
            Some(true) => permission.activate(),
            Some(false) => permission.deactivate(),
            None => {}
        }

        self.permissions
            .update_permission(permission.clone())
            .await?;

        self.audit(
            actor,
            AuditAction::PermissionUpdated,
            PERMISSION_RESOURCE,
            permission.id().to_string(),
            format!(
                "updated permission '{}' ({})",
                permission.name(),
                permission.state().as_str()
            ),
        )
        .await?;

        Ok(permission)
    }

    /// Deactivates a permission and emits an audit event.
    pub async fn deactivate_permission(
        &self,
        actor: &UserIdentity,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        self.require(actor, PERMISSIONS_MANAGE).await?;

        let mut permission = self.guard_context.permission(permission_id).await?;
        permission.deactivate();
        self.permissions
            .update_permission(permission.clone())
            .await?;

        self.audit(
            actor,
            AuditAction::PermissionDeactivated,
            PERMISSION_RESOURCE,
            permission.id().to_string(),
            format!("deactivated permission '{}'", permission.name()),
        )
        .await?;

        Ok(permission)
    }

    async fn ensure_permission_name_free(
        &self,
        guard: Guard,
        name: &RbacName,
        except: Option<PermissionId>,
    ) -> AppResult<()> {
        match self.permissions.find_permission_by_name(guard, name).await? {
            Some(existing) if Some(existing.id()) != except => Err(AppError::Validation(format!(
                "permission '{name}' already exists in guard '{guard}'"
            ))),
            _ => Ok(()),
        }
    }
}
