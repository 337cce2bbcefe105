//! Liftgate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dev_seed;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use liftgate_core::{AppError, Guard};
use liftgate_infrastructure::InMemoryRbacStore;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, StorageBackend, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{
    RbacRepositories, RbacServices, build_memory_session_layer, build_postgres_session_layer,
    build_services, connect_and_migrate,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let app = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            let services = build_services(RbacRepositories::postgres(&pool));
            prepare_rbac(&services, &config).await?;

            let session_layer = build_postgres_session_layer(pool, config.cookie_secure).await?;
            build_router(services.app_state, &config.frontend_url, session_layer)?
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; all roles and assignments are lost on restart");
            let store = Arc::new(InMemoryRbacStore::new());
            let services = build_services(RbacRepositories::in_memory(store.clone()));
            prepare_rbac(&services, &config).await?;

            if let Some(token) = config.dev_api_token.as_deref() {
                dev_seed::seed_dev_owner(&store, &services.guard_context, token).await?;
            }

            build_router(
                services.app_state,
                &config.frontend_url,
                build_memory_session_layer(config.cookie_secure),
            )?
        }
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "liftgate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Bootstraps the system catalog when enabled, then refuses to start on
/// guard integrity violations.
async fn prepare_rbac(services: &RbacServices, config: &ApiConfig) -> Result<(), AppError> {
    if config.bootstrap_system_roles {
        for guard in Guard::all() {
            let report = services
                .catalog_bootstrap_service
                .ensure_system_catalog(*guard)
                .await?;
            info!(
                %guard,
                roles_created = report.roles_created,
                permissions_created = report.permissions_created,
                "system catalog ensured"
            );
        }
    }

    services.guard_context.verify_integrity().await
}
