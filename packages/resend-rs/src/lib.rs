//! Minimal Resend REST API client.
//!
//! Only the single-email send endpoint is implemented.
//!
//! ```rust,ignore
//! use resend::{ResendClient, SendEmailRequest};
//!
//! let client = ResendClient::new("re_123".into());
//! let sent = client
//!     .send_email(&SendEmailRequest {
//!         from: "App <noreply@example.com>".into(),
//!         to: vec!["user@example.com".into()],
//!         subject: "Hello".into(),
//!         html: "<p>Hello</p>".into(),
//!         text: Some("Hello".into()),
//!     })
//!     .await?;
//! println!("{}", sent.id);
//! ```

pub mod error;
pub mod types;

pub use error::{ResendError, Result};
pub use types::{SendEmailRequest, SendEmailResponse};

use types::ApiErrorBody;

const BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ResendClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send one email. Returns the Resend message id.
    pub async fn send_email(&self, request: &SendEmailRequest) -> Result<SendEmailResponse> {
        let url = format!("{}/emails", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(ResendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendEmailResponse = resp.json().await?;
        tracing::debug!(id = %sent.id, "Resend accepted email");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_without_empty_text() {
        let request = SendEmailRequest {
            from: "App <noreply@example.com>".to_string(),
            to: vec!["user@example.com".to_string()],
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["to"][0], "user@example.com");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_error_body_parses() {
        let body = r#"{"statusCode": 422, "name": "validation_error", "message": "Invalid `to` field."}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message, "Invalid `to` field.");
    }
}
