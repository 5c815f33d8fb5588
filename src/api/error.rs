use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::types::ErrorResponse;

/// Errors a handler can return. Every variant renders as `{"error": ...}`.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn unknown_node(id: &str) -> Self {
        Self::NotFound(format!("Node '{id}' not found"))
    }

    pub fn endpoint_not_found() -> Self {
        Self::NotFound("Endpoint not found".to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::unknown_node("Z").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages() {
        assert_eq!(ApiError::unknown_node("Z").to_string(), "Node 'Z' not found");
        assert_eq!(ApiError::endpoint_not_found().to_string(), "Endpoint not found");
        assert_eq!(ApiError::Internal.to_string(), "Internal server error");
        assert_eq!(ApiError::BadRequest("duplicate field".into()).to_string(), "duplicate field");
    }
}
