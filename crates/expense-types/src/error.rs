use thiserror::Error;

/// Errors from talking to a Solid pod or its identity provider.
///
/// Each variant is surfaced to REST callers with its own status code, so
/// a missing resource is never confused with a failed login or a dead
/// network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PodError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error("access forbidden: {0}")]
    Forbidden(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource conflict: {0}")]
    Conflict(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unexpected status {status} from {uri}")]
    UnexpectedStatus { status: u16, uri: String },
}

impl PodError {
    /// Classify a non-success status returned for `uri`.
    pub fn from_status(status: u16, uri: &str) -> Self {
        match status {
            401 => PodError::Unauthorized(uri.to_string()),
            403 => PodError::Forbidden(uri.to_string()),
            404 | 410 => PodError::NotFound(uri.to_string()),
            409 | 412 => PodError::Conflict(uri.to_string()),
            _ => PodError::UnexpectedStatus {
                status,
                uri: uri.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PodError::NotFound(_))
    }
}
