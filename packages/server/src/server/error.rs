//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domains::account::actions::ProfileError;
use crate::domains::auth::AuthError;

/// Error body shared by every failing endpoint
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 with the offending field, when known
    Validation {
        message: String,
        field: Option<&'static str>,
    },
    Unauthorized,
    NotFound(&'static str),
    /// 500; the detail has already been logged
    Internal(&'static str),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, field: Option<&'static str>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field,
        }
    }

    /// Map an auth failure, naming the request field that carried the contact
    pub fn from_auth(err: AuthError, contact_field: &'static str) -> Self {
        match err {
            AuthError::InvalidContact(e) => Self::validation(e.to_string(), Some(contact_field)),
            AuthError::ChannelDisabled(_) => Self::validation(err.to_string(), Some(contact_field)),
            AuthError::InvalidCodeFormat => Self::validation(err.to_string(), Some("code")),
            AuthError::InvalidOrExpiredCode => Self::validation(err.to_string(), None),
            AuthError::Delivery(e) => {
                error!("Code delivery failed: {}", e);
                ApiError::Internal("Failed to send verification code")
            }
            AuthError::Storage(e) => {
                error!("Database error during sign-in: {}", e);
                ApiError::Internal("Internal server error")
            }
            AuthError::Token(e) => {
                error!("Failed to mint session token: {}", e);
                ApiError::Internal("Internal server error")
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::from_auth(err, "contact")
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Invalid { field, message } => Self::validation(message, Some(field)),
            ProfileError::NotFound => ApiError::NotFound("User not found"),
            ProfileError::Storage(e) => {
                error!("Database error during profile update: {}", e);
                ApiError::Internal("Failed to update profile")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, field) = match self {
            ApiError::Validation { message, field } => (message, field),
            ApiError::Unauthorized => ("Unauthorized".to_string(), None),
            ApiError::NotFound(message) | ApiError::Internal(message) => (message.to_string(), None),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
                field,
            }),
        )
            .into_response()
    }
}
