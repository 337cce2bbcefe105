use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use liftgate_core::{AppResult, Guard, NonEmptyString};
use liftgate_domain::{
    CatalogPermission, Permission, PermissionId, RbacName, Role, RoleId, SystemRole,
    permission_catalog,
};

use crate::{PermissionRepository, RolePermissionRegistry, RoleRepository};

/// Counts of records created by one bootstrap pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogBootstrapReport {
    /// System roles created in this pass.
    pub roles_created: usize,
    /// Catalog permissions created in this pass.
    pub permissions_created: usize,
}

/// Seeds the system roles and the gym permission catalog into a guard.
#[derive(Clone)]
pub struct CatalogBootstrapService {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    registry: RolePermissionRegistry,
}

impl CatalogBootstrapService {
    /// Creates a bootstrap service.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        registry: RolePermissionRegistry,
    ) -> Self {
        Self {
            roles,
            permissions,
            registry,
        }
    }

    /// Idempotently creates missing system roles and catalog permissions in `guard`.
    ///
    /// Newly created roles receive their default grants. `super_admin` is
    /// topped up to the full catalog on every pass; grants of the other
    /// existing roles are left as administrators configured them.
    pub async fn ensure_system_catalog(&self, guard: Guard) -> AppResult<CatalogBootstrapReport> {
        let mut report = CatalogBootstrapReport::default();

        let mut catalog_ids = BTreeMap::new();
        for entry in permission_catalog() {
            let (permission_id, created) = self.ensure_permission(guard, entry).await?;
            if created {
                report.permissions_created += 1;
            }
            catalog_ids.insert(entry.name, permission_id);
        }

        for system_role in SystemRole::all() {
            let (role_id, created) = self.ensure_role(guard, *system_role).await?;
            if created {
                report.roles_created += 1;
            }

            if created || *system_role == SystemRole::SuperAdmin {
                for grant in system_role.default_grants() {
                    if let Some(permission_id) = catalog_ids.get(grant) {
                        self.registry.grant(role_id, *permission_id).await?;
                    }
                }
            }
        }

        info!(
            %guard,
            roles_created = report.roles_created,
            permissions_created = report.permissions_created,
            "system catalog ensured"
        );
        Ok(report)
    }

    async fn ensure_permission(
        &self,
        guard: Guard,
        entry: &CatalogPermission,
    ) -> AppResult<(PermissionId, bool)> {
        let name = RbacName::new(entry.name)?;
        if let Some(existing) = self
            .permissions
            .find_permission_by_name(guard, &name)
            .await?
        {
            return Ok((existing.id(), false));
        }

        let permission = Permission::new(
            PermissionId::new(),
            guard,
            name,
            NonEmptyString::new(entry.display_name)?,
            Some(entry.category.to_owned()),
            entry.scope,
        );
        let permission_id = permission.id();
        self.permissions.insert_permission(permission).await?;

        Ok((permission_id, true))
    }

    async fn ensure_role(&self, guard: Guard, system_role: SystemRole) -> AppResult<(RoleId, bool)> {
        let name = RbacName::new(system_role.as_str())?;
        if let Some(existing) = self.roles.find_role_by_name(guard, &name).await? {
            return Ok((existing.id(), false));
        }

        let role = Role::new(
            RoleId::new(),
            guard,
            name,
            NonEmptyString::new(system_role.display_name())?,
            None,
        );
        let role_id = role.id();
        self.roles.insert_role(role).await?;

        Ok((role_id, true))
    }
}
