// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};

use crate::client::ClientError;
use crate::database::StoreError;
use crate::middleware::response::respond_with_error;
use crate::rbac::RbacError;
use crate::types::ObjectIdError;

/// Failure categories surfaced to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    NotImplemented,
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::NotImplemented => 501,
            ErrorKind::Internal => 500,
        }
    }

    /// Categorize a failure that only exists as text, e.g. an error body
    /// returned by a remote service. Checked in priority order.
    pub fn from_message(message: &str) -> Self {
        const NOT_FOUND: &[&str] = &["no documents in result", "out of bounds", "not found"];
        const CONFLICT: &[&str] = &["E11000 duplicate key error", "E11001 duplicate key error"];
        const BAD_REQUEST: &[&str] = &[
            "E10334",
            "Invalid request payload, unable to marshal into json, err: ",
        ];

        let contains_any = |markers: &[&str]| markers.iter().any(|m| message.contains(m));
        if contains_any(NOT_FOUND) {
            ErrorKind::NotFound
        } else if contains_any(CONFLICT) {
            ErrorKind::Conflict
        } else if contains_any(BAD_REQUEST) {
            ErrorKind::BadRequest
        } else {
            ErrorKind::Internal
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 501 Not Implemented
    NotImplemented(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::BadRequest,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::NotImplemented(_) => ErrorKind::NotImplemented,
            ApiError::InternalServerError(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotImplemented(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Error body as sent to clients. Double quotes are dropped from the
    /// message so it reads cleanly once JSON-escaped.
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message().replace('"', "") })
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::BadRequest => ApiError::BadRequest(message),
            ErrorKind::Unauthorized => ApiError::Unauthorized(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::Conflict => ApiError::Conflict(message),
            ErrorKind::NotImplemented => ApiError::NotImplemented(message),
            ErrorKind::Internal => ApiError::InternalServerError(message),
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_kind(ErrorKind::from_message(&message), message)
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        ApiError::NotImplemented(message.into())
    }
}

/// Status code for an optional failure; no failure means 200.
pub fn classify(err: Option<&ApiError>) -> u16 {
    err.map_or(200, ApiError::status_code)
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound(_) | StoreError::UnmatchedUpdate { .. } => ApiError::NotFound(message),
            StoreError::Duplicate(_) => ApiError::Conflict(message),
            StoreError::Marshal(_) => ApiError::BadRequest(message),
            StoreError::NotImplemented(_) => ApiError::NotImplemented(message),
            StoreError::UnmodifiedUpdate { .. } | StoreError::Timeout(_) => {
                ApiError::InternalServerError(message)
            }
            StoreError::Database(_) => {
                tracing::error!("Database error: {}", message);
                ApiError::InternalServerError(message)
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingCredential => ApiError::Unauthorized(err.to_string()),
            // remote services only hand back text
            ClientError::Remote { message, .. } => ApiError::from_message(message),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl From<RbacError> for ApiError {
    fn from(err: RbacError) -> Self {
        match err {
            RbacError::Client(e) => e.into(),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl From<ObjectIdError> for ApiError {
    fn from(err: ObjectIdError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        respond_with_error(status, self.message())
    }
}
