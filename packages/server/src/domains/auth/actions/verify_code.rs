//! Verify code action

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::common::Contact;
use crate::domains::account::models::{Account, AccountSummary};
use crate::domains::auth::code::is_well_formed;
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::VerificationCode;
use crate::kernel::ServerDeps;

/// Outcome of a successful verification
#[derive(Debug, Clone)]
pub struct VerifiedAccount {
    pub account: AccountSummary,
    pub token: String,
}

/// Consume a submitted code and resolve the contact's account.
///
/// Wrong, expired, already-used and unknown-contact cases all fail with
/// `AuthError::InvalidOrExpiredCode`.
pub async fn verify_code(
    contact: Contact,
    code: &str,
    deps: &ServerDeps,
) -> Result<VerifiedAccount, AuthError> {
    verify_code_at(contact, code, Utc::now(), deps).await
}

pub async fn verify_code_at(
    contact: Contact,
    code: &str,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<VerifiedAccount, AuthError> {
    let code = code.trim();
    if !is_well_formed(code) {
        return Err(AuthError::InvalidCodeFormat);
    }

    let mut tx = deps.db_pool.begin().await?;

    let Some(redeemed) = VerificationCode::redeem(contact.as_str(), code, now, &mut *tx).await?
    else {
        info!(contact = %contact, "Verification failed");
        return Err(AuthError::InvalidOrExpiredCode);
    };

    let account = Account::resolve_verified(&contact, &mut *tx).await.map_err(|e| {
        error!(contact = %contact, "Failed to resolve account: {}", e);
        e
    })?;

    tx.commit().await?;

    let token = deps.jwt_service.create_token_at(
        account.id,
        contact.email().map(str::to_string),
        contact.phone().map(str::to_string),
        now,
    )?;

    info!(
        contact = %contact,
        code_id = %redeemed.id,
        account_id = %account.id,
        "Verification succeeded"
    );

    Ok(VerifiedAccount {
        account: account.summary(),
        token,
    })
}
