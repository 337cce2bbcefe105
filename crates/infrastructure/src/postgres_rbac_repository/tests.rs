use std::collections::BTreeSet;

use liftgate_application::{
    GuardIntegrityIssue, GuardIntegrityRepository, PermissionRepository, RolePermissionRepository,
    RoleRepository, UserRepository, UserRoleRepository,
};
use liftgate_core::{AppError, Guard, NonEmptyString, UserId};
use liftgate_domain::{Permission, PermissionId, PermissionScope, RbacName, Role, RoleId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresRbacRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres rbac tests: {error}");
    }

    Some(pool)
}

/// Names are suffixed so repeated runs against one database do not collide.
fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

async fn insert_user(pool: &PgPool) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query("INSERT INTO users (id, email, display_name) VALUES ($1, $2, $3)")
        .bind(user_id.as_uuid())
        .bind(format!("{}@gym.test", unique("member")))
        .bind("Member")
        .execute(pool)
        .await;
    assert!(insert.is_ok());
    user_id
}

async fn insert_role(repository: &PostgresRbacRepository, guard: Guard, name: &str) -> RoleId {
    let (Ok(rbac_name), Ok(display_name)) = (RbacName::new(name), NonEmptyString::new(name)) else {
        panic!("test role '{name}' must be valid");
    };
    let role = Role::new(RoleId::new(), guard, rbac_name, display_name, None);
    let role_id = role.id();
    assert!(repository.insert_role(role).await.is_ok());
    role_id
}

async fn insert_permission(
    repository: &PostgresRbacRepository,
    guard: Guard,
    name: &str,
) -> PermissionId {
    let (Ok(rbac_name), Ok(display_name)) = (RbacName::new(name), NonEmptyString::new(name)) else {
        panic!("test permission '{name}' must be valid");
    };
    let permission = Permission::new(
        PermissionId::new(),
        guard,
        rbac_name,
        display_name,
        Some("subscriptions".to_owned()),
        PermissionScope::Global,
    );
    let permission_id = permission.id();
    assert!(repository.insert_permission(permission).await.is_ok());
    permission_id
}

#[tokio::test]
async fn duplicate_role_name_in_guard_maps_to_validation() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let name = unique("coach");
    insert_role(&repository, Guard::Web, &name).await;
    insert_role(&repository, Guard::Api, &name).await;

    let (Ok(rbac_name), Ok(display_name)) = (RbacName::new(&name), NonEmptyString::new("Coach"))
    else {
        panic!("test role must be valid");
    };
    let duplicate = repository
        .insert_role(Role::new(
            RoleId::new(),
            Guard::Web,
            rbac_name,
            display_name,
            None,
        ))
        .await;

    assert!(matches!(duplicate, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn role_round_trips_lifecycle_state() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let role_id = insert_role(&repository, Guard::Web, &unique("front_desk")).await;

    let Ok(Some(mut role)) = repository.find_role(role_id).await else {
        panic!("role should be stored");
    };
    assert!(role.deactivate().is_ok());
    assert!(repository.update_role(role).await.is_ok());

    let stored = repository.find_role(role_id).await;
    assert!(matches!(stored, Ok(Some(role)) if !role.is_active()));
}

#[tokio::test]
async fn replace_permissions_applies_difference() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let role_id = insert_role(&repository, Guard::Web, &unique("trainer")).await;
    let view = insert_permission(&repository, Guard::Web, &unique("subscriptions.view")).await;
    let manage = insert_permission(&repository, Guard::Web, &unique("subscriptions.manage")).await;
    let banners = insert_permission(&repository, Guard::Web, &unique("banners.manage")).await;

    assert!(
        repository
            .replace_permissions(role_id, &BTreeSet::from([view, banners]))
            .await
            .is_ok()
    );
    assert!(
        repository
            .replace_permissions(role_id, &BTreeSet::from([view, manage]))
            .await
            .is_ok()
    );

    let ids = repository
        .list_permissions_for_role(role_id)
        .await
        .unwrap_or_default()
        .iter()
        .map(Permission::id)
        .collect::<BTreeSet<_>>();
    assert_eq!(ids, BTreeSet::from([view, manage]));
}

#[tokio::test]
async fn replace_permissions_rejects_cross_guard_and_unknown_ids() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool);
    let role_id = insert_role(&repository, Guard::Web, &unique("admin")).await;
    let web = insert_permission(&repository, Guard::Web, &unique("roles.view")).await;
    let api = insert_permission(&repository, Guard::Api, &unique("roles.manage")).await;
    assert!(repository.grant_permission(role_id, web).await.is_ok());

    let cross_guard = repository
        .replace_permissions(role_id, &BTreeSet::from([api]))
        .await;
    assert!(matches!(cross_guard, Err(AppError::InvalidState(_))));

    let unknown = repository
        .replace_permissions(role_id, &BTreeSet::from([PermissionId::new()]))
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let kept = repository
        .list_permissions_for_role(role_id)
        .await
        .unwrap_or_default();
    assert_eq!(kept.iter().map(Permission::id).collect::<Vec<_>>(), vec![web]);
}

#[tokio::test]
async fn replace_roles_is_scoped_to_one_guard() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;
    let web_member = insert_role(&repository, Guard::Web, &unique("member")).await;
    let web_trainer = insert_role(&repository, Guard::Web, &unique("trainer")).await;
    let api_member = insert_role(&repository, Guard::Api, &unique("member")).await;
    assert!(repository.attach_role(user_id, web_member).await.is_ok());
    assert!(repository.attach_role(user_id, api_member).await.is_ok());

    assert!(
        repository
            .replace_roles(user_id, Guard::Web, &BTreeSet::from([web_trainer]))
            .await
            .is_ok()
    );

    let web = repository
        .list_roles_for_user(user_id, Guard::Web)
        .await
        .unwrap_or_default();
    let api = repository
        .list_roles_for_user(user_id, Guard::Api)
        .await
        .unwrap_or_default();
    assert_eq!(web.iter().map(Role::id).collect::<Vec<_>>(), vec![web_trainer]);
    assert_eq!(api.iter().map(Role::id).collect::<Vec<_>>(), vec![api_member]);

    let missing_user = repository
        .replace_roles(UserId::new(), Guard::Web, &BTreeSet::from([web_trainer]))
        .await;
    assert!(matches!(missing_user, Err(AppError::NotFound(_))));

    let found = repository.find_user(user_id).await;
    assert!(matches!(found, Ok(Some(user)) if user.id() == user_id));
}

#[tokio::test]
async fn attaching_unknown_role_maps_to_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;

    let result = repository.attach_role(user_id, RoleId::new()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn integrity_check_reports_unknown_guards_and_cross_guard_edges() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacRepository::new(pool.clone());
    let role_name = unique("legacy");
    let role_id = insert_role(&repository, Guard::Web, &role_name).await;
    let permission_name = unique("legacy.manage");
    let permission_id = insert_permission(&repository, Guard::Api, &permission_name).await;
    assert!(repository.grant_permission(role_id, permission_id).await.is_ok());

    let patched_name = unique("patched");
    let patch = sqlx::query(
        "INSERT INTO roles (id, guard, name, display_name) VALUES ($1, 'sanctum', $2, 'Patched')",
    )
    .bind(Uuid::new_v4())
    .bind(&patched_name)
    .execute(&pool)
    .await;
    assert!(patch.is_ok());

    let issues = repository
        .find_guard_integrity_issues()
        .await
        .unwrap_or_default();

    assert!(issues.iter().any(|issue| matches!(
        issue,
        GuardIntegrityIssue::UnknownRoleGuard { role_name, guard, .. }
            if role_name == &patched_name && guard == "sanctum"
    )));
    assert!(issues.contains(&GuardIntegrityIssue::CrossGuardGrant {
        role_name,
        role_guard: "web".to_owned(),
        permission_name,
        permission_guard: "api".to_owned(),
    }));

    let cleanup = sqlx::query("DELETE FROM roles WHERE name = $1")
        .bind(&patched_name)
        .execute(&pool)
        .await;
    assert!(cleanup.is_ok());
    let cleanup = sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id.as_uuid())
        .execute(&pool)
        .await;
    assert!(cleanup.is_ok());
}
