use std::sync::Arc;

use tracing::{error, info};

use liftgate_core::{AppError, AppResult, Guard};
use liftgate_domain::{Permission, PermissionId, RbacName, Role, RoleId};

use crate::{GuardIntegrityIssue, GuardIntegrityRepository, PermissionRepository, RoleRepository};

/// Guard-qualified resolution of role and permission records.
///
/// Every name lookup takes an explicit guard. Callers derive the guard from
/// the authenticated identity; nothing here falls back to a default guard.
#[derive(Clone)]
pub struct GuardContext {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    integrity: Arc<dyn GuardIntegrityRepository>,
}

impl GuardContext {
    /// Creates a guard context from repository implementations.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        integrity: Arc<dyn GuardIntegrityRepository>,
    ) -> Self {
        Self {
            roles,
            permissions,
            integrity,
        }
    }

    /// Resolves a role name within one guard.
    pub async fn resolve_role(&self, name: &str, guard: Guard) -> AppResult<Role> {
        let not_found = || AppError::NotFound(format!("role '{name}' not found in guard '{guard}'"));
        let name = RbacName::new(name).map_err(|_| not_found())?;

        self.roles
            .find_role_by_name(guard, &name)
            .await?
            .ok_or_else(not_found)
    }

    /// Resolves a permission name within one guard.
    pub async fn resolve_permission(&self, name: &str, guard: Guard) -> AppResult<Permission> {
        let not_found =
            || AppError::NotFound(format!("permission '{name}' not found in guard '{guard}'"));
        let name = RbacName::new(name).map_err(|_| not_found())?;

        self.permissions
            .find_permission_by_name(guard, &name)
            .await?
            .ok_or_else(not_found)
    }

    /// Loads a role by id.
    pub async fn role(&self, role_id: RoleId) -> AppResult<Role> {
        self.roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Loads a permission by id.
    pub async fn permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.permissions
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    /// Lists guard consistency problems without failing.
    pub async fn integrity_issues(&self) -> AppResult<Vec<GuardIntegrityIssue>> {
        self.integrity.find_guard_integrity_issues().await
    }

    /// Fails with `InvalidState` when any role, permission or grant breaks guard consistency.
    pub async fn verify_integrity(&self) -> AppResult<()> {
        let issues = self.integrity_issues().await?;

        if issues.is_empty() {
            info!("guard integrity check passed");
            return Ok(());
        }

        for issue in &issues {
            error!(%issue, "guard integrity violation");
        }

        Err(AppError::InvalidState(format!(
            "{} guard integrity violation(s): {}",
            issues.len(),
            issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use liftgate_core::{AppError, Guard};

    use super::GuardContext;
    use crate::test_fakes::FakeRbacStore;

    fn context(store: &std::sync::Arc<FakeRbacStore>) -> GuardContext {
        GuardContext::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn same_name_resolves_per_guard() {
        let store = FakeRbacStore::shared();
        let web_admin = store.add_role(Guard::Web, "admin").await;
        let api_admin = store.add_role(Guard::Api, "admin").await;
        let context = context(&store);

        let web = context.resolve_role("admin", Guard::Web).await;
        let api = context.resolve_role("admin", Guard::Api).await;

        assert!(matches!(web, Ok(role) if role.id() == web_admin));
        assert!(matches!(api, Ok(role) if role.id() == api_admin));
    }

    #[tokio::test]
    async fn name_missing_in_guard_is_not_found() {
        let store = FakeRbacStore::shared();
        store.add_permission(Guard::Web, "banners.manage").await;
        let context = context(&store);

        let result = context.resolve_permission("banners.manage", Guard::Api).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let malformed = context.resolve_role("Not A Name", Guard::Web).await;
        assert!(matches!(malformed, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn cross_guard_grant_fails_integrity_check() {
        let store = FakeRbacStore::shared();
        let role_id = store.add_role(Guard::Web, "admin").await;
        let permission_id = store.add_permission(Guard::Api, "roles.manage").await;
        let context = context(&store);

        assert!(context.verify_integrity().await.is_ok());

        store.link(role_id, permission_id).await;
        let result = context.verify_integrity().await;
        assert!(matches!(result, Err(AppError::InvalidState(message)) if message.contains("roles.manage")));
    }
}
