use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use liftgate_application::{
    ApiTokenRepository, AuditEvent, AuditRepository, GuardIntegrityIssue,
    GuardIntegrityRepository, PermissionRepository, RolePermissionRepository, RoleRepository,
    UserRepository, UserRoleRepository, hash_api_token,
};
use liftgate_core::{AppError, AppResult, Guard, UserId};
use liftgate_domain::{Permission, PermissionId, RbacName, Role, RoleId, User};

#[derive(Debug, Default)]
struct RbacGraph {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    api_tokens: BTreeMap<String, UserId>,
    audit_events: Vec<AuditEvent>,
}

impl RbacGraph {
    fn ensure_role(&self, role_id: RoleId) -> AppResult<&Role> {
        self.roles
            .get(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn ensure_permission(&self, permission_id: PermissionId) -> AppResult<&Permission> {
        self.permissions.get(&permission_id).ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' was not found"))
        })
    }

    fn ensure_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            return Ok(());
        }

        Err(AppError::NotFound(format!("user '{user_id}' was not found")))
    }
}

/// In-memory RBAC store for development and tests.
///
/// The whole graph sits behind one lock, so a full replace is observed
/// either entirely or not at all.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    graph: RwLock<RbacGraph>,
}

impl InMemoryRbacStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user account.
    pub async fn insert_user(&self, user: User) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        if graph
            .users
            .values()
            .any(|stored| stored.email() == user.email() && stored.id() != user.id())
        {
            return Err(AppError::Validation(format!(
                "user '{}' already exists",
                user.email().as_str()
            )));
        }

        graph.users.insert(user.id(), user);
        Ok(())
    }

    /// Registers a bearer token for a user. Only the token digest is kept.
    pub async fn register_api_token(&self, raw_token: &str, user_id: UserId) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_user(user_id)?;
        graph.api_tokens.insert(hash_api_token(raw_token), user_id);
        Ok(())
    }

    /// Returns every audit event appended so far, oldest first.
    ///
    /// The log is never truncated, so long-running processes should use the
    /// Postgres backend.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.graph.read().await.audit_events.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryRbacStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.graph.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacStore {
    async fn list_roles(&self, guard: Guard) -> AppResult<Vec<Role>> {
        let graph = self.graph.read().await;

        let mut roles: Vec<Role> = graph
            .roles
            .values()
            .filter(|role| role.guard() == guard)
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.graph.read().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, guard: Guard, name: &RbacName) -> AppResult<Option<Role>> {
        Ok(self
            .graph
            .read()
            .await
            .roles
            .values()
            .find(|role| role.guard() == guard && role.name() == name)
            .cloned())
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        let mut graph = self.graph.write().await;

        if graph
            .roles
            .values()
            .any(|stored| stored.guard() == role.guard() && stored.name() == role.name())
        {
            return Err(AppError::Validation(format!(
                "role '{}' already exists in guard '{}'",
                role.name(),
                role.guard()
            )));
        }

        graph.roles.insert(role.id(), role);
        Ok(())
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_role(role.id())?;

        if graph.roles.values().any(|stored| {
            stored.id() != role.id() && stored.guard() == role.guard() && stored.name() == role.name()
        }) {
            return Err(AppError::Validation(format!(
                "role '{}' already exists in guard '{}'",
                role.name(),
                role.guard()
            )));
        }

        graph.roles.insert(role.id(), role);
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacStore {
    async fn list_permissions(&self, guard: Guard) -> AppResult<Vec<Permission>> {
        let graph = self.graph.read().await;

        let mut permissions: Vec<Permission> = graph
            .permissions
            .values()
            .filter(|permission| permission.guard() == guard)
            .cloned()
            .collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(permissions)
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .graph
            .read()
            .await
            .permissions
            .get(&permission_id)
            .cloned())
    }

    async fn find_permission_by_name(
        &self,
        guard: Guard,
        name: &RbacName,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .graph
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.guard() == guard && permission.name() == name)
            .cloned())
    }

    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        let mut graph = self.graph.write().await;

        if graph.permissions.values().any(|stored| {
            stored.guard() == permission.guard() && stored.name() == permission.name()
        }) {
            return Err(AppError::Validation(format!(
                "permission '{}' already exists in guard '{}'",
                permission.name(),
                permission.guard()
            )));
        }

        graph.permissions.insert(permission.id(), permission);
        Ok(())
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_permission(permission.id())?;

        if graph.permissions.values().any(|stored| {
            stored.id() != permission.id()
                && stored.guard() == permission.guard()
                && stored.name() == permission.name()
        }) {
            return Err(AppError::Validation(format!(
                "permission '{}' already exists in guard '{}'",
                permission.name(),
                permission.guard()
            )));
        }

        graph.permissions.insert(permission.id(), permission);
        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryRbacStore {
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_role(role_id)?;
        graph.ensure_permission(permission_id)?;

        graph.role_permissions.insert((role_id, permission_id));
        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.graph
            .write()
            .await
            .role_permissions
            .remove(&(role_id, permission_id));
        Ok(())
    }

    async fn replace_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_role(role_id)?;
        for permission_id in permission_ids {
            graph.ensure_permission(*permission_id)?;
        }

        graph
            .role_permissions
            .retain(|(stored_role_id, permission_id)| {
                stored_role_id != &role_id || permission_ids.contains(permission_id)
            });
        graph.role_permissions.extend(
            permission_ids
                .iter()
                .map(|permission_id| (role_id, *permission_id)),
        );

        Ok(())
    }

    async fn list_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let graph = self.graph.read().await;

        Ok(graph
            .role_permissions
            .range((role_id, PermissionId::from_uuid(uuid::Uuid::nil()))..)
            .take_while(|(stored_role_id, _)| stored_role_id == &role_id)
            .filter_map(|(_, permission_id)| graph.permissions.get(permission_id).cloned())
            .collect())
    }
}

#[async_trait]
impl UserRoleRepository for InMemoryRbacStore {
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_user(user_id)?;
        graph.ensure_role(role_id)?;

        graph.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.graph
            .write()
            .await
            .user_roles
            .remove(&(user_id, role_id));
        Ok(())
    }

    async fn replace_roles(
        &self,
        user_id: UserId,
        guard: Guard,
        role_ids: &BTreeSet<RoleId>,
    ) -> AppResult<()> {
        let mut graph = self.graph.write().await;
        graph.ensure_user(user_id)?;
        for role_id in role_ids {
            graph.ensure_role(*role_id)?;
        }

        let in_guard: BTreeSet<RoleId> = graph
            .roles
            .values()
            .filter(|role| role.guard() == guard)
            .map(Role::id)
            .collect();

        graph.user_roles.retain(|(stored_user_id, role_id)| {
            stored_user_id != &user_id || !in_guard.contains(role_id) || role_ids.contains(role_id)
        });
        graph
            .user_roles
            .extend(role_ids.iter().map(|role_id| (user_id, *role_id)));

        Ok(())
    }

    async fn list_roles_for_user(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>> {
        let graph = self.graph.read().await;

        Ok(graph
            .user_roles
            .iter()
            .filter(|(stored_user_id, _)| stored_user_id == &user_id)
            .filter_map(|(_, role_id)| graph.roles.get(role_id))
            .filter(|role| role.guard() == guard)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GuardIntegrityRepository for InMemoryRbacStore {
    async fn find_guard_integrity_issues(&self) -> AppResult<Vec<GuardIntegrityIssue>> {
        let graph = self.graph.read().await;

        Ok(graph
            .role_permissions
            .iter()
            .filter_map(|(role_id, permission_id)| {
                let role = graph.roles.get(role_id)?;
                let permission = graph.permissions.get(permission_id)?;

                (role.guard() != permission.guard()).then(|| GuardIntegrityIssue::CrossGuardGrant {
                    role_name: role.name().to_string(),
                    role_guard: role.guard().to_string(),
                    permission_name: permission.name().to_string(),
                    permission_guard: permission.guard().to_string(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl ApiTokenRepository for InMemoryRbacStore {
    async fn find_user_by_token_hash(&self, token_hash: &str) -> AppResult<Option<User>> {
        let graph = self.graph.read().await;

        Ok(graph
            .api_tokens
            .get(token_hash)
            .and_then(|user_id| graph.users.get(user_id))
            .cloned())
    }
}

#[async_trait]
impl AuditRepository for InMemoryRbacStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.graph.write().await.audit_events.push(event);
        Ok(())
    }
}
