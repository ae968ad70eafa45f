use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Local store error: {0}")]
    LocalStore(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(msg) | StoreError::Conflict(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::LocalStore(other.to_string()),
        }
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Whether retrying the same request later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::NetworkError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "Admin access required"),
            ApiError::AccessDenied(ref body) if body == "Admin access required"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "Player not found"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "end_time must be after start_time"),
            ApiError::InvalidResponse(ref msg) if msg.contains("400")
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("520 total bytes"));

        // Multi-byte characters straddling the cut must not panic
        let wide = "⚾".repeat(MAX_ERROR_BODY_LENGTH);
        assert!(ApiError::truncate_body(&wide).contains("truncated"));
    }

    #[test]
    fn test_from_store_error() {
        assert!(matches!(
            ApiError::from(StoreError::Invalid("first_name is required".into())),
            ApiError::InvalidRequest(ref msg) if msg == "first_name is required"
        ));
        let shape = StoreError::WrongShape {
            key: "concessions".into(),
            expected: "list",
        };
        assert!(matches!(
            ApiError::from(shape),
            ApiError::LocalStore(ref msg) if msg.contains("concessions")
        ));
    }

    #[test]
    fn test_is_transient() {
        assert!(ApiError::RateLimited.is_transient());
        assert!(ApiError::ServerError("boom".into()).is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
    }
}
