use std::str::FromStr;

use liftgate_core::{AppError, AppResult, Guard, UserIdentity};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Success envelope shared by every administrative endpoint.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Optional `?guard=` filter on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct GuardQuery {
    pub guard: Option<String>,
}

/// Uses the requested guard, or the guard the caller authenticated with.
pub fn resolve_guard(requested: Option<&str>, actor: &UserIdentity) -> AppResult<Guard> {
    requested
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(Guard::from_str)
        .transpose()
        .map(|guard| guard.unwrap_or(actor.guard()))
}

/// Parses a transport identifier into a typed id.
pub fn parse_id<T>(value: &str, kind: &str, build: impl FnOnce(Uuid) -> T) -> AppResult<T> {
    Uuid::parse_str(value.trim())
        .map(build)
        .map_err(|_| AppError::Validation(format!("{kind} id '{value}' is not a valid uuid")))
}
