use axum::extract::{Extension, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use liftgate_core::{AppError, Guard, UserIdentity};
use tower_sessions::Session;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key holding the identity written by the external login flow.
pub const SESSION_USER_KEY: &str = "liftgate.user";

/// Capability a route group requires before its handlers run.
#[derive(Debug, Clone, Copy)]
pub struct RequiredCapability(pub &'static str);

/// Resolves the caller and fixes its guard from the credential type.
///
/// A bearer token always yields an `api` identity; without an
/// `Authorization` header the cookie session must carry a `web` identity.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = match bearer_token(request.headers())? {
        Some(token) => state
            .api_token_service
            .resolve_bearer(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or revoked api token".to_owned()))?,
        None => session_identity(&session).await?,
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Rejects callers lacking the route group's [`RequiredCapability`] in their guard.
pub async fn require_capability(
    State(state): State<AppState>,
    Extension(required): Extension<RequiredCapability>,
    Extension(user): Extension<UserIdentity>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    state
        .authorization_service
        .require_permission(&user, required.0)
        .await?;

    debug!(
        user_id = %user.user_id(),
        guard = %user.guard(),
        capability = required.0,
        "route capability granted"
    );
    Ok(next.run(request).await)
}

async fn session_identity(session: &Session) -> ApiResult<UserIdentity> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    if identity.guard() != Guard::Web {
        return Err(AppError::Unauthorized(format!(
            "session identities must use the '{}' guard",
            Guard::Web
        ))
        .into());
    }

    Ok(identity)
}

fn bearer_token(headers: &HeaderMap) -> ApiResult<Option<&str>> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(Some)
        .ok_or_else(|| {
            AppError::Unauthorized("authorization header must use the Bearer scheme".to_owned())
                .into()
        })
}
