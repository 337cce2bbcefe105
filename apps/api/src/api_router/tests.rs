use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use liftgate_application::{GuardContext, UserRoleRepository};
use liftgate_core::{Guard, NonEmptyString, UserId};
use liftgate_domain::{EmailAddress, User};
use liftgate_infrastructure::InMemoryRbacStore;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_router;
use crate::api_services::{RbacRepositories, build_memory_session_layer, build_services};

const FRONTEND_URL: &str = "http://localhost:8081";

struct TestApp {
    router: Router,
    store: Arc<InMemoryRbacStore>,
    guard_context: GuardContext,
}

async fn test_app() -> TestApp {
    let store = Arc::new(InMemoryRbacStore::new());
    let services = build_services(RbacRepositories::in_memory(store.clone()));

    for guard in Guard::all() {
        let report = services
            .catalog_bootstrap_service
            .ensure_system_catalog(*guard)
            .await;
        assert!(report.is_ok());
    }

    let router = build_router(
        services.app_state,
        FRONTEND_URL,
        build_memory_session_layer(false),
    );
    let Ok(router) = router else {
        panic!("router should build");
    };

    TestApp {
        router,
        store,
        guard_context: services.guard_context,
    }
}

impl TestApp {
    /// Creates a user holding `role_name` in `guard` and reachable through `token`.
    async fn member(&self, guard: Guard, role_name: &str, token: &str) -> UserId {
        let user_id = UserId::new();
        let (Ok(email), Ok(display_name)) = (
            EmailAddress::new(format!("{token}@gym.test")),
            NonEmptyString::new(role_name),
        ) else {
            panic!("test member '{token}' must be valid");
        };
        let inserted = self
            .store
            .insert_user(User::new(user_id, email, display_name, None))
            .await;
        assert!(inserted.is_ok());

        let Ok(role) = self.guard_context.resolve_role(role_name, guard).await else {
            panic!("system role '{role_name}' should be bootstrapped in {guard}");
        };
        assert!(self.store.attach_role(user_id, role.id()).await.is_ok());
        assert!(self.store.register_api_token(token, user_id).await.is_ok());

        user_id
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request for {method} {uri} should build");
        };

        let Ok(response) = self.router.clone().oneshot(request).await else {
            panic!("router should answer {method} {uri}");
        };
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let payload = serde_json::from_slice::<Value>(&bytes).unwrap_or_default();

        (status, payload)
    }
}

fn names(payload: &Value) -> Vec<String> {
    payload["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;

    let (status, payload) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn missing_or_unknown_credentials_are_unauthorized() {
    let app = test_app().await;

    let (status, payload) = app.send("GET", "/api/me/access", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["success"], false);
    assert!(payload["errors"].as_array().is_some_and(|errors| !errors.is_empty()));

    let (status, _) = app
        .send("GET", "/api/me/access", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_tokens_evaluate_in_the_api_guard() {
    let app = test_app().await;
    app.member(Guard::Api, "super_admin", "api-owner").await;
    app.member(Guard::Web, "super_admin", "web-owner").await;

    let (status, payload) = app.send("GET", "/api/roles", Some("api-owner"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], true);
    assert_eq!(
        names(&payload),
        vec!["admin", "super_admin", "trainer", "user"]
    );
    assert!(
        payload["data"]
            .as_array()
            .is_some_and(|roles| roles.iter().all(|role| role["guard"] == "api"))
    );

    let (status, payload) = app
        .send("GET", "/api/roles?guard=web", Some("api-owner"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        payload["data"]
            .as_array()
            .is_some_and(|roles| roles.iter().all(|role| role["guard"] == "web"))
    );

    let (status, _) = app.send("GET", "/api/roles", Some("web-owner"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn trainer_reads_members_but_cannot_manage_roles() {
    let app = test_app().await;
    let trainer = app.member(Guard::Api, "trainer", "coach").await;

    let (status, payload) = app.send("GET", "/api/me/access", Some("coach"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["user_id"], trainer.to_string());
    assert_eq!(payload["data"]["is_trainer"], true);
    assert_eq!(payload["data"]["is_admin"], false);
    assert!(
        payload["data"]["permissions"]
            .as_array()
            .is_some_and(|permissions| permissions.contains(&json!("subscriptions.manage"))
                && !permissions.contains(&json!("roles.manage")))
    );

    let (status, _) = app.send("GET", "/api/roles", Some("coach"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "GET",
            &format!("/api/users/{trainer}/permissions"),
            Some("coach"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_lifecycle_through_the_api() {
    let app = test_app().await;
    app.member(Guard::Api, "super_admin", "owner").await;

    let (status, payload) = app
        .send(
            "POST",
            "/api/roles",
            Some("owner"),
            Some(json!({ "name": "front_desk", "display_name": "Front desk" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payload["data"]["guard"], "api");
    assert_eq!(payload["data"]["is_active"], true);
    let role_id = payload["data"]["role_id"].as_str().unwrap_or_default().to_owned();

    let (status, payload) = app
        .send(
            "POST",
            "/api/roles",
            Some("owner"),
            Some(json!({ "name": "front_desk", "display_name": "Again" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(payload["success"], false);

    let (status, payload) = app
        .send("DELETE", &format!("/api/roles/{role_id}"), Some("owner"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["state"], "deactivated");

    let (status, payload) = app
        .send(
            "PUT",
            &format!("/api/roles/{role_id}"),
            Some("owner"),
            Some(json!({ "is_active": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["is_active"], true);
}

#[tokio::test]
async fn rejected_bodies_use_the_error_envelope() {
    let app = test_app().await;
    app.member(Guard::Api, "super_admin", "owner").await;

    let (status, payload) = app
        .send("POST", "/api/roles", Some("owner"), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["message"], "Validation failed");
    assert!(
        payload["errors"][0]
            .as_str()
            .is_some_and(|detail| detail.contains("name"))
    );

    let (status, payload) = app
        .send("PUT", "/api/users/not-a-user/role", Some("owner"), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(payload["success"], false);
}

#[tokio::test]
async fn protected_roles_cannot_be_deactivated() {
    let app = test_app().await;
    app.member(Guard::Api, "super_admin", "owner").await;
    let Ok(trainer) = app.guard_context.resolve_role("trainer", Guard::Api).await else {
        panic!("trainer should be bootstrapped");
    };

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/roles/{}", trainer.id()),
            Some("owner"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_permissions_are_replaced_and_cross_guard_ids_conflict() {
    let app = test_app().await;
    app.member(Guard::Api, "super_admin", "owner").await;
    let (Ok(trainer), Ok(banners), Ok(web_banners)) = (
        app.guard_context.resolve_role("trainer", Guard::Api).await,
        app.guard_context
            .resolve_permission("banners.manage", Guard::Api)
            .await,
        app.guard_context
            .resolve_permission("banners.manage", Guard::Web)
            .await,
    ) else {
        panic!("catalog should be bootstrapped");
    };
    let uri = format!("/api/roles/{}/permissions", trainer.id());

    let (status, payload) = app
        .send(
            "POST",
            &uri,
            Some("owner"),
            Some(json!({ "permission_ids": [banners.id().to_string()] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&payload), vec!["banners.manage"]);

    let (status, _) = app
        .send(
            "POST",
            &uri,
            Some("owner"),
            Some(json!({ "permission_ids": [web_banners.id().to_string()] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            "POST",
            &uri,
            Some("owner"),
            Some(json!({ "permission_ids": ["not-a-uuid"] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, payload) = app.send("GET", &uri, Some("owner"), None).await;
    assert_eq!(names(&payload), vec!["banners.manage"]);
}

#[tokio::test]
async fn change_role_guards_self_and_requires_super_admin() {
    let app = test_app().await;
    let owner = app.member(Guard::Api, "super_admin", "owner").await;
    let member = app.member(Guard::Api, "user", "member").await;
    app.member(Guard::Api, "admin", "manager").await;

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/users/{owner}/role"),
            Some("owner"),
            Some(json!({ "role": "user" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/users/{member}/role"),
            Some("manager"),
            Some(json!({ "role": "trainer" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, payload) = app
        .send(
            "PUT",
            &format!("/api/users/{member}/role"),
            Some("owner"),
            Some(json!({ "role": "trainer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["name"], "trainer");

    let (status, payload) = app
        .send(
            "GET",
            &format!("/api/users/{member}/roles"),
            Some("owner"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&payload), vec!["trainer"]);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/users/{member}/role"),
            Some("owner"),
            Some(json!({ "role": "night_shift" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_are_audited() {
    let app = test_app().await;
    app.member(Guard::Api, "super_admin", "owner").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/permissions",
            Some("owner"),
            Some(json!({
                "name": "lockers.manage",
                "display_name": "Manage lockers",
                "category": "lockers",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let events = app.store.audit_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].guard, Guard::Api);
    assert_eq!(events[0].resource_type, "rbac_permission");
}
