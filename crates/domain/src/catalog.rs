//! Built-in gym permission catalog and the default grants of system roles.

use crate::{PermissionScope, SystemRole};

/// Permission shipped with every installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPermission {
    /// Machine name.
    pub name: &'static str,
    /// Human-readable label.
    pub display_name: &'static str,
    /// Grouping category.
    pub category: &'static str,
    /// Resource reach.
    pub scope: PermissionScope,
}

const fn global(
    name: &'static str,
    display_name: &'static str,
    category: &'static str,
) -> CatalogPermission {
    CatalogPermission {
        name,
        display_name,
        category,
        scope: PermissionScope::Global,
    }
}

const CATALOG: &[CatalogPermission] = &[
    global("roles.view", "View roles", "roles"),
    global("roles.manage", "Manage roles", "roles"),
    global("permissions.view", "View permissions", "permissions"),
    global("permissions.manage", "Manage permissions", "permissions"),
    global("users.view", "View members", "users"),
    global("users.manage", "Manage members", "users"),
    global("products.view", "View products", "products"),
    global("products.manage", "Manage products", "products"),
    global("categories.view", "View categories", "categories"),
    global("categories.manage", "Manage categories", "categories"),
    global("subscriptions.view", "View subscriptions", "subscriptions"),
    global("subscriptions.manage", "Manage subscriptions", "subscriptions"),
    global("banners.view", "View banners", "banners"),
    global("banners.manage", "Manage banners", "banners"),
    global("notifications.view", "View notifications", "notifications"),
    global("notifications.send", "Send notifications", "notifications"),
    CatalogPermission {
        name: "profile.update",
        display_name: "Update own profile",
        category: "profile",
        scope: PermissionScope::Own,
    },
];

/// Returns every built-in permission.
#[must_use]
pub fn permission_catalog() -> &'static [CatalogPermission] {
    CATALOG
}

impl SystemRole {
    /// Returns the catalog permission names granted when the role is bootstrapped.
    #[must_use]
    pub fn default_grants(&self) -> Vec<&'static str> {
        let names = CATALOG.iter().map(|permission| permission.name);

        match self {
            Self::SuperAdmin => names.collect(),
            Self::Admin => names
                .filter(|name| !matches!(*name, "roles.manage" | "permissions.manage"))
                .collect(),
            Self::Trainer => vec![
                "users.view",
                "subscriptions.view",
                "subscriptions.manage",
                "notifications.view",
                "profile.update",
            ],
            Self::User => vec![
                "products.view",
                "categories.view",
                "subscriptions.view",
                "banners.view",
                "notifications.view",
                "profile.update",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::permission_catalog;
    use crate::{RbacName, SystemRole};

    #[test]
    fn catalog_names_are_valid_and_unique() {
        let mut seen = BTreeSet::new();
        for permission in permission_catalog() {
            assert!(RbacName::new(permission.name).is_ok());
            assert!(seen.insert(permission.name), "{} listed twice", permission.name);
        }
    }

    #[test]
    fn default_grants_reference_catalog_entries() {
        let known = permission_catalog()
            .iter()
            .map(|permission| permission.name)
            .collect::<BTreeSet<_>>();

        for role in SystemRole::all() {
            for grant in role.default_grants() {
                assert!(known.contains(grant), "{grant} missing from catalog");
            }
        }
    }

    #[test]
    fn only_super_admin_manages_roles_by_default() {
        for role in SystemRole::all() {
            let manages_roles = role.default_grants().contains(&"roles.manage");
            assert_eq!(manages_roles, *role == SystemRole::SuperAdmin);
        }
    }
}
