//! Minimal Twilio client for sending SMS through the Messages API.
//!
//! ```rust,ignore
//! use twilio::{TwilioOptions, TwilioService};
//!
//! let twilio = TwilioService::new(TwilioOptions {
//!     account_sid: "AC...".into(),
//!     auth_token: "secret".into(),
//!     from_number: "+15005550006".into(),
//! });
//! twilio.send_sms("+447123456789", "hello").await?;
//! ```

use std::collections::HashMap;

pub mod error;
pub mod models;

pub use error::{Result, TwilioError};
pub use models::MessageResponse;

use reqwest::{header, Client};

use crate::models::ApiErrorBody;

const BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
    base_url: String,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API host (local stubs, regional edges).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{base}/2010-04-01/Accounts/{sid}/Messages.json",
            base = self.base_url,
            sid = self.options.account_sid
        )
    }

    /// Send a plain-text SMS to `recipient`.
    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", &self.options.from_number);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Twilio rejected message");

            let message = serde_json::from_str::<ApiErrorBody>(&error_body)
                .map(|e| e.message)
                .unwrap_or(error_body);
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let message = response.json::<MessageResponse>().await?;
        tracing::debug!(sid = %message.sid, status = %message.status, "Twilio accepted message");
        Ok(message)
    }
}
