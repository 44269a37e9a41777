// HTTP API error type shared by every handler and guard.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

/// API error carrying the operation summary (`message`) and the failure
/// detail (`error`), matching the `{message, error}` response envelope.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    error: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Unauthorized, message, error)
    }

    pub fn forbidden(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Forbidden, message, error)
    }

    pub fn not_found(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, message, error)
    }

    pub fn conflict(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Conflict, message, error)
    }

    pub fn internal(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Internal, message, error)
    }

    fn new(kind: ErrorKind, message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            kind,
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message, self.error)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Single logging point: every failure is recorded server-side
        // before the normalized envelope goes out.
        tracing::error!("{}: {}", self.message, self.error);

        let body = json!({
            "message": self.message,
            "error": self.error,
        });

        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_kinds() {
        let cases = [
            (
                ApiError::unauthorized("m", "e"),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::forbidden("m", "e"), StatusCode::FORBIDDEN),
            (ApiError::not_found("m", "e"), StatusCode::NOT_FOUND),
            (ApiError::conflict("m", "e"), StatusCode::CONFLICT),
            (
                ApiError::internal("m", "e"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn display_pairs_message_and_detail() {
        let err = ApiError::not_found(
            "Failed to retrieve board",
            "Could not find board in database",
        );
        assert_eq!(
            err.to_string(),
            "Failed to retrieve board: Could not find board in database"
        );
    }

    #[test]
    fn detail_accepts_any_display_type() {
        let err = ApiError::internal("Failed to verify role", sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().starts_with("Failed to verify role: "));
    }
}
