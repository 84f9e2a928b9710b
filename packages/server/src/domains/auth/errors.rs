use thiserror::Error;

use crate::common::{ContactError, ContactKind};
use crate::kernel::DeliveryError;

/// Message shared by every failed verification, whatever the cause.
pub const INVALID_OR_EXPIRED: &str = "Invalid or expired verification code";

/// Errors raised by code issuance and verification
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    InvalidContact(#[from] ContactError),

    #[error("Code must be 6 digits")]
    InvalidCodeFormat,

    #[error("{} verification is disabled", .0.label())]
    ChannelDisabled(ContactKind),

    /// Wrong code, expired code, consumed code and unknown contact all map here
    #[error("{}", INVALID_OR_EXPIRED)]
    InvalidOrExpiredCode,

    #[error("Failed to deliver verification code: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
