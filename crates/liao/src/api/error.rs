//! API error taxonomy.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::chat::ChatError;

/// API errors surfaced to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields. No side effects occurred.
    #[error("{0}")]
    Validation(String),

    /// Credential or verification-code failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Caller does not own the referenced resource.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Persistence failure. Details are logged, not exposed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ApiError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::ConversationNotFound => Self::NotFound("conversation not found".to_string()),
            ChatError::NotOwner => {
                Self::Forbidden("conversation belongs to another user".to_string())
            }
            ChatError::Storage(e) => Self::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // AuthError carries its own status mapping.
            ApiError::Auth(err) => err.into_response(),
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Storage(err) => {
                tracing::error!("storage error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        message: "internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;

    #[test]
    fn test_chat_error_mapping() {
        assert!(matches!(
            ApiError::from(ChatError::ConversationNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(ChatError::NotOwner),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(ChatError::Storage(anyhow::anyhow!("boom"))),
            ApiError::Storage(_)
        ));
    }

    #[test]
    fn test_validation_message() {
        let err = ApiError::validation("message and conversationId are required");
        assert_eq!(err.to_string(), "message and conversationId are required");
    }
}
