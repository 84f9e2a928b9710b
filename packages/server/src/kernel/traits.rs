// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseCodeDelivery)

use async_trait::async_trait;
use thiserror::Error;

use crate::common::{Contact, ContactKind};

// =============================================================================
// Code Delivery Trait (Infrastructure - SMS/Email)
// =============================================================================

/// A verification code ready to be sent to a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMessage {
    pub code: String,
    pub valid_for_minutes: i64,
}

/// Provider acknowledgement for a delivered code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no {0} provider configured")]
    NotConfigured(ContactKind),

    #[error("SMS delivery failed: {0}")]
    Sms(#[from] twilio::TwilioError),

    #[error("Email delivery failed: {0}")]
    Email(#[from] resend::ResendError),

    #[error("Delivery failed: {0}")]
    Other(String),
}

#[async_trait]
pub trait BaseCodeDelivery: Send + Sync {
    /// Deliver `message` to `contact` over the channel matching its kind
    async fn deliver(
        &self,
        contact: &Contact,
        message: &CodeMessage,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
