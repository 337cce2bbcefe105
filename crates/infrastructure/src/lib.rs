//! Infrastructure adapters for Liftgate.

#![forbid(unsafe_code)]

mod in_memory_rbac_store;
mod postgres_api_token_repository;
mod postgres_audit_repository;
mod postgres_rbac_repository;

pub use in_memory_rbac_store::InMemoryRbacStore;
pub use postgres_api_token_repository::PostgresApiTokenRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_rbac_repository::PostgresRbacRepository;
