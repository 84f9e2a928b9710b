//! Issue code action

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::common::Contact;
use crate::domains::auth::code::generate_code;
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::VerificationCode;
use crate::kernel::{CodeMessage, ServerDeps};

/// Outcome of a successful issuance
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub contact: Contact,
    pub expires_at: DateTime<Utc>,
    /// The code itself, only when the environment echoes codes
    pub dev_code: Option<String>,
}

/// Generate, store and deliver a fresh code for `contact`.
///
/// Earlier outstanding codes for the contact stay valid until they expire.
pub async fn issue_code(contact: Contact, deps: &ServerDeps) -> Result<IssuedCode, AuthError> {
    issue_code_at(contact, Utc::now(), deps).await
}

pub async fn issue_code_at(
    contact: Contact,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<IssuedCode, AuthError> {
    let settings = &deps.settings;
    if !settings.channel_enabled(contact.kind()) {
        info!(channel = %contact.kind(), "Rejected code request for disabled channel");
        return Err(AuthError::ChannelDisabled(contact.kind()));
    }

    let code = generate_code();
    let expires_at = now + settings.code_ttl;

    let stored = VerificationCode::create(contact.as_str(), &code, now, expires_at, &deps.db_pool)
        .await
        .map_err(|e| {
            error!(contact = %contact, "Failed to store verification code: {}", e);
            e
        })?;

    let message = CodeMessage::new(code, settings.code_ttl_minutes());
    let receipt = deps
        .delivery
        .deliver(&contact, &message)
        .await
        .map_err(|e| {
            error!(contact = %contact, channel = %contact.kind(), "Failed to deliver code: {}", e);
            e
        })?;

    info!(
        contact = %contact,
        code_id = %stored.id,
        message_id = %receipt.message_id,
        "Verification code issued"
    );

    Ok(IssuedCode {
        contact,
        expires_at,
        dev_code: settings.echo_codes().then_some(message.code),
    })
}
