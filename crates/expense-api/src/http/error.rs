//! Application error type mapping to HTTP status codes and envelope format.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use expense_types::error::PodError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure talking to the pod or its identity provider.
    Pod(PodError),
    /// Missing or malformed request input.
    Validation(String),
    /// Request rejected while reading its body (too large, broken multipart).
    Rejected(StatusCode, String),
}

impl From<PodError> for AppError {
    fn from(e: PodError) -> Self {
        AppError::Pod(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => {
                AppError::Rejected(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text())
            }
            _ => AppError::Validation(rejection.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Pod(e @ PodError::Transport(_)) => {
                (StatusCode::BAD_GATEWAY, "POD_UNREACHABLE", e.to_string())
            }
            AppError::Pod(e @ PodError::Unauthorized(_)) => {
                (StatusCode::UNAUTHORIZED, "POD_UNAUTHORIZED", e.to_string())
            }
            AppError::Pod(e @ PodError::Forbidden(_)) => {
                (StatusCode::FORBIDDEN, "POD_FORBIDDEN", e.to_string())
            }
            AppError::Pod(e @ PodError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND", e.to_string())
            }
            AppError::Pod(e @ PodError::Conflict(_)) => {
                (StatusCode::CONFLICT, "RESOURCE_CONFLICT", e.to_string())
            }
            AppError::Pod(e @ PodError::MalformedPayload(_)) => {
                (StatusCode::BAD_GATEWAY, "MALFORMED_PAYLOAD", e.to_string())
            }
            AppError::Pod(e @ PodError::UnexpectedStatus { .. }) => {
                (StatusCode::BAD_GATEWAY, "POD_ERROR", e.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Rejected(status, msg) => (*status, "REQUEST_REJECTED", msg.clone()),
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, code, message = %message, "request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: PodError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn test_pod_errors_map_to_statuses() {
        assert_eq!(status_of(PodError::Transport("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(PodError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(PodError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(PodError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PodError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(PodError::MalformedPayload("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(PodError::UnexpectedStatus {
                status: 500,
                uri: "https://pod.example/".into()
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        let response = AppError::Validation("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
