use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The token was valid but names a principal that is absent or not active.
    #[error("authentication rejected: {0}")]
    AuthenticationRejected(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn authentication_rejected(message: impl Into<String>) -> Self {
        Self::AuthenticationRejected(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn token(err: impl Into<String>) -> Self {
        Self::Token(err.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for the errors that mean "this request is not authenticated".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized(_) | AppError::AuthenticationRejected(_) | AppError::Token(_)
        )
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized(_) | AppError::AuthenticationRejected(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::Database(err) = &self {
            tracing::error!(error = %err, "database error");
        }

        let message = self.to_string();
        let error = match &self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::AuthenticationRejected(_) => "authentication_rejected",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Configuration(_) => "configuration",
            AppError::Token(_) => "token",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        };

        let payload = ErrorResponse {
            error: error.to_string(),
            message,
        };

        (status, Json(payload)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_principal_is_a_distinct_401() {
        let err = AppError::authentication_rejected("user not found or inactive");
        assert!(err.is_authentication_failure());
        assert_eq!(err.to_string(), "authentication rejected: user not found or inactive");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_is_not_an_authentication_failure() {
        let err = AppError::forbidden("missing Read permission on Roles");
        assert!(!err.is_authentication_failure());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
