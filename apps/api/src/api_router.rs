use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use liftgate_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::handlers::{health, rbac};
use crate::middleware::{self, RequiredCapability};
use crate::state::AppState;

mod cors;

pub fn build_router<S>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let role_routes = Router::new()
        .route(
            "/api/roles",
            get(rbac::list_roles_handler).post(rbac::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            put(rbac::update_role_handler).delete(rbac::deactivate_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            get(rbac::list_role_permissions_handler).post(rbac::replace_role_permissions_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions/{permission_id}",
            put(rbac::grant_role_permission_handler).delete(rbac::revoke_role_permission_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_capability,
        ))
        .layer(axum::Extension(RequiredCapability("roles.view")));

    let permission_routes = Router::new()
        .route(
            "/api/permissions",
            get(rbac::list_permissions_handler).post(rbac::create_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            put(rbac::update_permission_handler).delete(rbac::deactivate_permission_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_capability,
        ))
        .layer(axum::Extension(RequiredCapability("permissions.view")));

    let user_routes = Router::new()
        .route(
            "/api/users/{user_id}/roles",
            get(rbac::list_user_roles_handler).post(rbac::replace_user_roles_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_id}",
            put(rbac::attach_user_role_handler).delete(rbac::detach_user_role_handler),
        )
        .route(
            "/api/users/{user_id}/permissions",
            get(rbac::list_user_permissions_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_capability,
        ))
        .layer(axum::Extension(RequiredCapability("users.view")));

    let protected_routes = Router::new()
        .merge(role_routes)
        .merge(permission_routes)
        .merge(user_routes)
        .route(
            "/api/users/{user_id}/role",
            put(rbac::change_user_role_handler),
        )
        .route("/api/me/access", get(rbac::my_access_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}

#[cfg(test)]
mod tests;
