use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the HTTP surface. Token failures are the only 401s;
/// bad login credentials and every downstream failure collapse to 400, and
/// 404 is reserved for the single-book fetch.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Downstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Downstream(e.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::Downstream(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };
        if let Self::Downstream(e) = &self {
            error!(error = %e, "request failed");
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let res = ApiError::validation("All fields are required.").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ApiError::unauthorized("No token provided.").into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = ApiError::not_found("Book not found.").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn downstream_maps_to_400_with_message_passed_through() {
        let err = ApiError::Downstream(anyhow::anyhow!("bucket unreachable"));
        assert_eq!(err.to_string(), "bucket unreachable");
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
