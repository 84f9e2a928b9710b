//! Code delivery backends.
//!
//! The backend is chosen once at startup from `DELIVERY_MODE`:
//! - `live` routes SMS through Twilio and email through Resend
//! - `log` writes codes to the log and never contacts a provider

use std::sync::Arc;

use async_trait::async_trait;
use resend::{ResendClient, SendEmailRequest};
use tracing::info;
use twilio::{TwilioOptions, TwilioService};
use uuid::Uuid;

use super::{BaseCodeDelivery, CodeMessage, DeliveryError, DeliveryReceipt};
use crate::common::{Contact, ContactKind};
use crate::config::{Config, DeliveryMode};

const PRODUCT_NAME: &str = "Pub Companion";

impl CodeMessage {
    pub fn new(code: impl Into<String>, valid_for_minutes: i64) -> Self {
        Self {
            code: code.into(),
            valid_for_minutes,
        }
    }

    pub fn sms_body(&self) -> String {
        format!(
            "Your {PRODUCT_NAME} verification code is: {}. Valid for {} minutes.",
            self.code, self.valid_for_minutes
        )
    }

    pub fn email_subject(&self) -> String {
        format!("Your {PRODUCT_NAME} verification code")
    }

    pub fn email_text(&self) -> String {
        format!(
            "Your {PRODUCT_NAME} verification code is {}.\n\nThis code expires in {} minutes. If you didn't request it, you can ignore this email.",
            self.code, self.valid_for_minutes
        )
    }

    pub fn email_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
  <body style="margin:0;padding:0;font-family:Arial,sans-serif;background-color:#f3f4f6;">
    <div style="max-width:600px;margin:0 auto;background-color:#ffffff;padding:40px 20px;text-align:center;">
      <h1 style="color:#6366f1;margin:0 0 24px 0;font-size:28px;">{PRODUCT_NAME}</h1>
      <p style="color:#4b5563;font-size:16px;">Enter this verification code to continue:</p>
      <div style="font-size:36px;font-weight:bold;letter-spacing:8px;font-family:'Courier New',monospace;margin:32px 0;">{code}</div>
      <p style="color:#6b7280;font-size:14px;">This code will expire in <strong>{minutes} minutes</strong>.</p>
      <p style="color:#9ca3af;font-size:12px;">If you didn't request this code, please ignore this email.</p>
    </div>
  </body>
</html>"#,
            code = self.code,
            minutes = self.valid_for_minutes,
        )
    }
}

// =============================================================================
// Live providers
// =============================================================================

/// Sends SMS through Twilio and email through Resend.
///
/// A channel without a configured provider fails with
/// `DeliveryError::NotConfigured` instead of falling back to logging.
pub struct ProviderDelivery {
    twilio: Option<Arc<TwilioService>>,
    resend: Option<Arc<ResendClient>>,
    email_from: String,
}

impl ProviderDelivery {
    pub fn new(
        twilio: Option<Arc<TwilioService>>,
        resend: Option<Arc<ResendClient>>,
        email_from: String,
    ) -> Self {
        Self {
            twilio,
            resend,
            email_from,
        }
    }
}

#[async_trait]
impl BaseCodeDelivery for ProviderDelivery {
    async fn deliver(
        &self,
        contact: &Contact,
        message: &CodeMessage,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        match contact {
            Contact::Phone(phone) => {
                let twilio = self
                    .twilio
                    .as_ref()
                    .ok_or(DeliveryError::NotConfigured(ContactKind::Phone))?;
                let sent = twilio.send_sms(phone, &message.sms_body()).await?;
                info!(sid = %sent.sid, "Verification SMS sent to {}", phone);
                Ok(DeliveryReceipt {
                    message_id: sent.sid,
                })
            }
            Contact::Email(email) => {
                let resend = self
                    .resend
                    .as_ref()
                    .ok_or(DeliveryError::NotConfigured(ContactKind::Email))?;
                let request = SendEmailRequest {
                    from: self.email_from.clone(),
                    to: vec![email.clone()],
                    subject: message.email_subject(),
                    html: message.email_html(),
                    text: Some(message.email_text()),
                };
                let sent = resend.send_email(&request).await?;
                info!(id = %sent.id, "Verification email sent to {}", email);
                Ok(DeliveryReceipt {
                    message_id: sent.id,
                })
            }
        }
    }
}

// =============================================================================
// Log-only delivery
// =============================================================================

/// Writes codes to the log. Selected explicitly with `DELIVERY_MODE=log`.
#[derive(Default)]
pub struct LogDelivery;

#[async_trait]
impl BaseCodeDelivery for LogDelivery {
    async fn deliver(
        &self,
        contact: &Contact,
        message: &CodeMessage,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let message_id = format!("log_{}", Uuid::new_v4());
        info!(
            channel = %contact.kind(),
            contact = %contact,
            code = %message.code,
            message_id = %message_id,
            "Verification code (log delivery, not sent)"
        );
        Ok(DeliveryReceipt { message_id })
    }
}

/// Build the delivery backend selected by configuration.
pub fn build_delivery(config: &Config) -> Arc<dyn BaseCodeDelivery> {
    match config.delivery_mode {
        DeliveryMode::Log => {
            tracing::warn!("DELIVERY_MODE=log: verification codes are logged, not sent");
            Arc::new(LogDelivery)
        }
        DeliveryMode::Live => {
            let twilio = config.twilio.as_ref().map(|t| {
                Arc::new(TwilioService::new(TwilioOptions {
                    account_sid: t.account_sid.clone(),
                    auth_token: t.auth_token.clone(),
                    from_number: t.phone_number.clone(),
                }))
            });
            let (resend, email_from) = match config.resend.as_ref() {
                Some(r) => (
                    Some(Arc::new(ResendClient::new(r.api_key.clone()))),
                    r.from.clone(),
                ),
                None => (None, String::new()),
            };
            Arc::new(ProviderDelivery::new(twilio, resend, email_from))
        }
    }
}
