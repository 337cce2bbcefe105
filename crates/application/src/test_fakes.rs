use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use liftgate_core::{AppError, AppResult, Guard, NonEmptyString, UserId, UserIdentity};
use liftgate_domain::{
    EmailAddress, Permission, PermissionId, PermissionScope, RbacName, Role, RoleId, User,
};

use crate::{
    AuditEvent, AuditRepository, GuardIntegrityIssue, GuardIntegrityRepository,
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRepository,
    UserRoleRepository,
};

#[derive(Default)]
pub(crate) struct FakeState {
    pub users: BTreeMap<UserId, User>,
    pub roles: BTreeMap<RoleId, Role>,
    pub permissions: BTreeMap<PermissionId, Permission>,
    pub role_permissions: BTreeSet<(RoleId, PermissionId)>,
    pub user_roles: BTreeSet<(UserId, RoleId)>,
}

/// Single-lock fake implementing every storage port.
#[derive(Default)]
pub(crate) struct FakeRbacStore {
    pub state: Mutex<FakeState>,
}

impl FakeRbacStore {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) async fn add_user(&self, name: &str) -> UserId {
        let user_id = UserId::new();
        let (Ok(email), Ok(display_name)) = (
            EmailAddress::new(format!("{name}@gym.test")),
            NonEmptyString::new(name),
        ) else {
            panic!("fake user '{name}' must be valid");
        };
        self.state
            .lock()
            .await
            .users
            .insert(user_id, User::new(user_id, email, display_name, None));
        user_id
    }

    pub(crate) async fn add_role(&self, guard: Guard, name: &str) -> RoleId {
        let (Ok(rbac_name), Ok(display_name)) = (RbacName::new(name), NonEmptyString::new(name))
        else {
            panic!("fake role '{name}' must be valid");
        };
        let role = Role::new(RoleId::new(), guard, rbac_name, display_name, None);
        let role_id = role.id();
        self.state.lock().await.roles.insert(role_id, role);
        role_id
    }

    pub(crate) async fn add_permission(&self, guard: Guard, name: &str) -> PermissionId {
        let (Ok(rbac_name), Ok(display_name)) = (RbacName::new(name), NonEmptyString::new(name))
        else {
            panic!("fake permission '{name}' must be valid");
        };
        let permission = Permission::new(
            PermissionId::new(),
            guard,
            rbac_name,
            display_name,
            None,
            PermissionScope::Global,
        );
        let permission_id = permission.id();
        self.state
            .lock()
            .await
            .permissions
            .insert(permission_id, permission);
        permission_id
    }

    pub(crate) async fn link(&self, role_id: RoleId, permission_id: PermissionId) {
        self.state
            .lock()
            .await
            .role_permissions
            .insert((role_id, permission_id));
    }

    pub(crate) async fn assign(&self, user_id: UserId, role_id: RoleId) {
        self.state.lock().await.user_roles.insert((user_id, role_id));
    }

    pub(crate) async fn set_role_active(&self, role_id: RoleId, active: bool) {
        let mut state = self.state.lock().await;
        if let Some(role) = state.roles.get_mut(&role_id) {
            let result = if active {
                role.activate()
            } else {
                role.deactivate()
            };
            assert!(result.is_ok());
        }
    }

    pub(crate) async fn set_permission_active(&self, permission_id: PermissionId, active: bool) {
        let mut state = self.state.lock().await;
        if let Some(permission) = state.permissions.get_mut(&permission_id) {
            if active {
                permission.activate();
            } else {
                permission.deactivate();
            }
        }
    }
}

pub(crate) fn identity(user_id: UserId, guard: Guard) -> UserIdentity {
    UserIdentity::new(user_id, "tester", None, guard)
}

#[async_trait]
impl UserRepository for FakeRbacStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl RoleRepository for FakeRbacStore {
    async fn list_roles(&self, guard: Guard) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        let mut roles = state
            .roles
            .values()
            .filter(|role| role.guard() == guard)
            .cloned()
            .collect::<Vec<_>>();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.lock().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, guard: Guard, name: &RbacName) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .values()
            .find(|role| role.guard() == guard && role.name() == name)
            .cloned())
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .roles
            .values()
            .any(|stored| stored.guard() == role.guard() && stored.name() == role.name())
        {
            return Err(AppError::Validation(format!(
                "role '{}' already exists",
                role.name()
            )));
        }
        state.roles.insert(role.id(), role);
        Ok(())
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!("role '{}'", role.id())));
        }
        state.roles.insert(role.id(), role);
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for FakeRbacStore {
    async fn list_permissions(&self, guard: Guard) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        let mut permissions = state
            .permissions
            .values()
            .filter(|permission| permission.guard() == guard)
            .cloned()
            .collect::<Vec<_>>();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .lock()
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
            .state
            .lock()
            .await
            .permissions
            .values()
            .find(|permission| permission.guard() == guard && permission.name() == name)
            .cloned())
    }

    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.permissions.values().any(|stored| {
            stored.guard() == permission.guard() && stored.name() == permission.name()
        }) {
            return Err(AppError::Validation(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }
        state.permissions.insert(permission.id(), permission);
        Ok(())
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.permissions.contains_key(&permission.id()) {
            return Err(AppError::NotFound(format!(
                "permission '{}'",
                permission.id()
            )));
        }
        state.permissions.insert(permission.id(), permission);
        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for FakeRbacStore {
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.link(role_id, permission_id).await;
        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.state
            .lock()
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
        let mut state = self.state.lock().await;
        state
            .role_permissions
            .retain(|(stored_role_id, _)| stored_role_id != &role_id);
        state.role_permissions.extend(
            permission_ids
                .iter()
                .map(|permission_id| (role_id, *permission_id)),
        );
        Ok(())
    }

    async fn list_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        Ok(state
            .role_permissions
            .iter()
            .filter(|(stored_role_id, _)| stored_role_id == &role_id)
            .filter_map(|(_, permission_id)| state.permissions.get(permission_id).cloned())
            .collect())
    }
}

#[async_trait]
impl UserRoleRepository for FakeRbacStore {
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.assign(user_id, role_id).await;
        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.state
            .lock()
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
        let mut state = self.state.lock().await;
        let in_guard = state
            .roles
            .values()
            .filter(|role| role.guard() == guard)
            .map(Role::id)
            .collect::<BTreeSet<_>>();
        state.user_roles.retain(|(stored_user_id, stored_role_id)| {
            !(stored_user_id == &user_id && in_guard.contains(stored_role_id))
        });
        state
            .user_roles
            .extend(role_ids.iter().map(|role_id| (user_id, *role_id)));
        Ok(())
    }

    async fn list_roles_for_user(&self, user_id: UserId, guard: Guard) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(stored_user_id, _)| stored_user_id == &user_id)
            .filter_map(|(_, role_id)| state.roles.get(role_id))
            .filter(|role| role.guard() == guard)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GuardIntegrityRepository for FakeRbacStore {
    async fn find_guard_integrity_issues(&self) -> AppResult<Vec<GuardIntegrityIssue>> {
        let state = self.state.lock().await;
        Ok(state
            .role_permissions
            .iter()
            .filter_map(|(role_id, permission_id)| {
                let role = state.roles.get(role_id)?;
                let permission = state.permissions.get(permission_id)?;
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

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
