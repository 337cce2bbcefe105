use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use liftgate_core::{AppError, AppResult, Guard, UserId, UserIdentity};
use liftgate_domain::{Role, RoleId, SystemRole, User};

use crate::{AuthorizationService, GuardContext, RoleRepository, UserRepository, UserRoleRepository};

/// Resolves and mutates which roles belong to which user.
#[derive(Clone)]
pub struct UserRoleAssignmentService {
    guard_context: GuardContext,
    authorization_service: AuthorizationService,
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    repository: Arc<dyn UserRoleRepository>,
}

impl UserRoleAssignmentService {
    /// Creates the assignment service from its collaborators.
    #[must_use]
    pub fn new(
        guard_context: GuardContext,
        authorization_service: AuthorizationService,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        repository: Arc<dyn UserRoleRepository>,
    ) -> Self {
        Self {
            guard_context,
            authorization_service,
            users,
            roles,
            repository,
        }
    }

    /// Replaces the user's roles within `guard` with exactly `role_ids`.
    pub async fn assign(
        &self,
        user_id: UserId,
        guard: Guard,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        self.user(user_id).await?;

        let mut desired = BTreeSet::new();
        let mut roles = Vec::new();
        for role_id in role_ids {
            if !desired.insert(*role_id) {
                continue;
            }

            let role = self.guard_context.role(*role_id).await?;
            ensure_role_guard(&role, guard)?;
            roles.push(role);
        }

        self.repository
            .replace_roles(user_id, guard, &desired)
            .await?;

        info!(%user_id, %guard, role_count = desired.len(), "user roles replaced");
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    /// Attaches one role to the user. Attaching twice is a no-op.
    pub async fn attach(&self, user_id: UserId, role_id: RoleId) -> AppResult<Role> {
        self.user(user_id).await?;
        let role = self.guard_context.role(role_id).await?;

        self.repository.attach_role(user_id, role_id).await?;

        info!(%user_id, role = %role.name(), guard = %role.guard(), "role attached to user");
        Ok(role)
    }

    /// Detaches one role from the user. Detaching a missing role is a no-op.
    pub async fn detach(&self, user_id: UserId, role_id: RoleId) -> AppResult<Role> {
        self.user(user_id).await?;
        let role = self.guard_context.role(role_id).await?;

        self.repository.detach_role(user_id, role_id).await?;

        info!(%user_id, role = %role.name(), guard = %role.guard(), "role detached from user");
        Ok(role)
    }

    /// Returns every role assigned to the user within `guard`, active or not.
    pub async fn roles_of(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>> {
        self.user(user_id).await?;

        let mut roles = self
            .repository
            .list_roles_for_user(user_id, guard)
            .await?
            .into_iter()
            .filter(|role| role.guard() == guard)
            .collect::<Vec<_>>();

        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    /// Returns only the active roles assigned to the user within `guard`.
    pub async fn active_roles_of(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>> {
        Ok(self
            .roles_of(user_id, guard)
            .await?
            .into_iter()
            .filter(Role::is_active)
            .collect())
    }

    /// Replaces the target's roles in the actor's guard with the single named role.
    ///
    /// Only `super_admin` actors may do this, and never on themselves.
    pub async fn change_role(
        &self,
        actor: &UserIdentity,
        target: UserId,
        new_role_name: &str,
    ) -> AppResult<Role> {
        if actor.user_id() == target {
            return Err(AppError::Forbidden(
                "users cannot change their own role".to_owned(),
            ));
        }

        self.authorization_service
            .require_role(actor, SystemRole::SuperAdmin)
            .await?;

        self.user(target).await?;

        let role = self
            .guard_context
            .resolve_role(new_role_name, actor.guard())
            .await?;
        if !role.is_active() {
            return Err(AppError::NotFound(format!(
                "role '{new_role_name}' is not active in guard '{}'",
                actor.guard()
            )));
        }

        self.repository
            .replace_roles(target, actor.guard(), &BTreeSet::from([role.id()]))
            .await?;

        info!(
            actor = %actor.user_id(),
            target = %target,
            role = %role.name(),
            guard = %actor.guard(),
            "user role changed"
        );
        Ok(role)
    }

    /// Deactivates a role. System roles refuse deactivation.
    pub async fn deactivate_role(&self, role_id: RoleId) -> AppResult<Role> {
        let mut role = self.guard_context.role(role_id).await?;
        role.deactivate()?;

        self.roles.update_role(role.clone()).await?;

        info!(role = %role.name(), guard = %role.guard(), "role deactivated");
        Ok(role)
    }

    async fn user(&self, user_id: UserId) -> AppResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }
}

fn ensure_role_guard(role: &Role, guard: Guard) -> AppResult<()> {
    if role.guard() != guard {
        return Err(AppError::InvalidState(format!(
            "role '{}' belongs to guard '{}' and cannot be assigned in guard '{guard}'",
            role.name(),
            role.guard()
        )));
    }

    Ok(())
}
