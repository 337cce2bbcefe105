use std::collections::BTreeSet;

use liftgate_core::{AppResult, Guard, UserId, UserIdentity};
use liftgate_domain::{AuditAction, Role, RoleId};

use super::{
    ROLES_MANAGE, RbacAdminService, USER_ROLE_RESOURCE, USERS_VIEW, ensure_not_self,
};
use crate::AccessSummary;

impl RbacAdminService {
    /// Lists the roles assigned to a user in a guard, with their lifecycle state.
    pub async fn user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        guard: Guard,
    ) -> AppResult<Vec<Role>> {
        self.require(actor, USERS_VIEW).await?;
        self.assignments.roles_of(user_id, guard).await
    }

    /// Replaces a user's roles within `guard` and emits an audit event.
    pub async fn replace_user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        guard: Guard,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        ensure_not_self(actor, user_id)?;
        self.require(actor, ROLES_MANAGE).await?;

        let roles = self.assignments.assign(user_id, guard, role_ids).await?;

        self.audit(
            actor,
            AuditAction::UserRolesReplaced,
            USER_ROLE_RESOURCE,
            user_id.to_string(),
            format!(
                "replaced roles of user '{user_id}' in guard '{guard}' with [{}]",
                role_names(&roles)
            ),
        )
        .await?;

        Ok(roles)
    }

    /// Attaches one role to a user and emits an audit event.
    pub async fn attach_user_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Role> {
        ensure_not_self(actor, user_id)?;
        self.require(actor, ROLES_MANAGE).await?;

        let role = self.assignments.attach(user_id, role_id).await?;

        self.audit(
            actor,
            AuditAction::UserRoleAttached,
            USER_ROLE_RESOURCE,
            format!("{user_id}:{role_id}"),
            format!("attached role '{}' to user '{user_id}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Detaches one role from a user and emits an audit event.
    pub async fn detach_user_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Role> {
        ensure_not_self(actor, user_id)?;
        self.require(actor, ROLES_MANAGE).await?;

        let role = self.assignments.detach(user_id, role_id).await?;

        self.audit(
            actor,
            AuditAction::UserRoleDetached,
            USER_ROLE_RESOURCE,
            format!("{user_id}:{role_id}"),
            format!("detached role '{}' from user '{user_id}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Replaces the target's roles in the actor's guard with one named role.
    pub async fn change_user_role(
        &self,
        actor: &UserIdentity,
        target: UserId,
        role_name: &str,
    ) -> AppResult<Role> {
        let role = self
            .assignments
            .change_role(actor, target, role_name)
            .await?;

        self.audit(
            actor,
            AuditAction::UserRoleChanged,
            USER_ROLE_RESOURCE,
            target.to_string(),
            format!(
                "changed role of user '{target}' to '{}' in guard '{}'",
                role.name(),
                role.guard()
            ),
        )
        .await?;

        Ok(role)
    }

    /// Returns the effective permission names of a user in a guard.
    pub async fn user_permissions(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        guard: Guard,
    ) -> AppResult<BTreeSet<String>> {
        self.require(actor, USERS_VIEW).await?;
        self.authorization_service
            .effective_permissions(user_id, guard)
            .await
    }

    /// Returns the caller's own access in the guard they authenticated with.
    pub async fn my_access(&self, actor: &UserIdentity) -> AppResult<AccessSummary> {
        self.authorization_service
            .access_summary(actor.user_id(), actor.guard())
            .await
    }
}

fn role_names(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.name().as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
