// Test doubles for infrastructure traits
//
// Used by unit tests and by the integration tests under tests/.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;

use super::{AuthSettings, BaseCodeDelivery, CodeMessage, DeliveryError, DeliveryReceipt, ServerDeps};
use crate::common::Contact;
use crate::config::{AppEnv, DeliveryMode};
use crate::domains::auth::JwtService;

pub const TEST_JWT_SECRET: &str = "test_secret_key_that_is_long_enough!";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

// =============================================================================
// Mock Code Delivery
// =============================================================================

/// A code captured by `MockCodeDelivery`
#[derive(Debug, Clone)]
pub struct SentCode {
    pub contact: Contact,
    pub message: CodeMessage,
}

/// Records every delivered code instead of sending it.
#[derive(Clone, Default)]
pub struct MockCodeDelivery {
    sent: Arc<Mutex<Vec<SentCode>>>,
    fail: Arc<AtomicBool>,
}

impl MockCodeDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All codes delivered so far
    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.lock().unwrap().clone()
    }

    /// The most recent code delivered to `contact` (normalized form)
    pub fn last_code_for(&self, contact: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.contact.as_str() == contact)
            .map(|s| s.message.code.clone())
    }
}

#[async_trait]
impl BaseCodeDelivery for MockCodeDelivery {
    async fn deliver(
        &self,
        contact: &Contact,
        message: &CodeMessage,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Other("mock delivery failure".to_string()));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentCode {
            contact: contact.clone(),
            message: message.clone(),
        });
        Ok(DeliveryReceipt {
            message_id: format!("mock_{}", sent.len()),
        })
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builder for `ServerDeps` wired with test doubles.
pub struct TestDependencies {
    pub delivery: MockCodeDelivery,
    pub settings: AuthSettings,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            delivery: MockCodeDelivery::new(),
            settings: AuthSettings {
                app_env: AppEnv::Test,
                delivery_mode: DeliveryMode::Log,
                code_ttl: Duration::minutes(10),
                email_enabled: true,
                sms_enabled: true,
                email_provider_configured: false,
                sms_provider_configured: false,
            },
        }
    }

    pub fn with_app_env(mut self, app_env: AppEnv) -> Self {
        self.settings.app_env = app_env;
        self
    }

    pub fn with_sms_enabled(mut self, enabled: bool) -> Self {
        self.settings.sms_enabled = enabled;
        self
    }

    pub fn with_email_enabled(mut self, enabled: bool) -> Self {
        self.settings.email_enabled = enabled;
        self
    }

    pub fn into_server_deps(self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            Arc::new(self.delivery),
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            self.settings,
        )
    }
}
