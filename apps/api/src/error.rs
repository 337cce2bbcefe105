use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use liftgate_core::AppError;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    success: bool,
    errors: Vec<String>,
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, detail) = match self.0 {
            AppError::Internal(detail) => {
                error!(%detail, "request failed with internal error");
                (
                    "Internal server error".to_owned(),
                    "an unexpected error occurred".to_owned(),
                )
            }
            AppError::Validation(detail) => ("Validation failed".to_owned(), detail),
            AppError::NotFound(detail) => ("Resource not found".to_owned(), detail),
            AppError::InvalidState(detail) => ("Conflicting state".to_owned(), detail),
            AppError::Unauthorized(detail) => ("Unauthenticated".to_owned(), detail),
            AppError::Forbidden(detail) => ("Forbidden".to_owned(), detail),
        };

        let payload = Json(ErrorResponse {
            success: false,
            errors: vec![detail],
            message,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use liftgate_core::AppError;

    use super::ApiError;

    #[test]
    fn error_categories_map_to_status_codes() {
        let cases = [
            (AppError::Validation("bad".to_owned()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NotFound("gone".to_owned()), StatusCode::NOT_FOUND),
            (AppError::InvalidState("guard".to_owned()), StatusCode::CONFLICT),
            (AppError::Unauthorized("who".to_owned()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("no".to_owned()), StatusCode::FORBIDDEN),
            (AppError::Internal("db".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }
}
