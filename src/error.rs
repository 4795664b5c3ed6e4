use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::render::RenderError;

#[derive(Debug)]
pub enum AppError {
    InvalidCredentials,
    Unauthorized,
    AdminRequired,
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Rejected(StatusCode, String),
    Render(RenderError),
    Session(String),
    Internal(String),
    Database(sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized | AppError::AdminRequired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Rejected(status, _) => *status,
            AppError::Render(_)
            | AppError::Session(_)
            | AppError::Internal(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Server-side failures are masked.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::AdminRequired => "Admin access required".to_string(),
            AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Rejected(_, msg) => msg.clone(),
            AppError::Render(_)
            | AppError::Session(_)
            | AppError::Internal(_)
            | AppError::Database(_) => "Internal Server Error".to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::AdminRequired => write!(f, "Admin access required"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Rejected(status, msg) => write!(f, "Rejected ({status}): {msg}"),
            AppError::Render(err) => write!(f, "Render Error: {err}"),
            AppError::Session(msg) => write!(f, "Session Error: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Unhandled application error: {self}");
        }

        let body = json!({ "message": self.message() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::Session(err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_401_with_fixed_messages() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.message(), "Invalid credentials");
        assert_eq!(AppError::Unauthorized.message(), "Unauthorized");
        assert_eq!(AppError::AdminRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AdminRequired.message(), "Admin access required");
    }

    #[test]
    fn server_errors_are_masked() {
        let err = AppError::Internal("connection reset by peer".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal Server Error");
    }

    #[test]
    fn rejections_keep_their_status() {
        let err = AppError::Rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "nope".to_string());
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.message(), "nope");
    }
}
