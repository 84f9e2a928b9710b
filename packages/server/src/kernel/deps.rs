use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::common::ContactKind;
use crate::config::{AppEnv, Config, DeliveryMode};
use crate::domains::auth::JwtService;
use crate::kernel::delivery::build_delivery;
use crate::kernel::BaseCodeDelivery;

/// Sign-in behaviour derived from configuration.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub app_env: AppEnv,
    pub delivery_mode: DeliveryMode,
    pub code_ttl: Duration,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub email_provider_configured: bool,
    pub sms_provider_configured: bool,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_env: config.app_env,
            delivery_mode: config.delivery_mode,
            code_ttl: Duration::seconds(config.code_ttl_secs),
            email_enabled: config.email_enabled,
            sms_enabled: config.sms_enabled,
            email_provider_configured: config.resend.is_some(),
            sms_provider_configured: config.twilio.is_some(),
        }
    }

    pub fn channel_enabled(&self, kind: ContactKind) -> bool {
        match kind {
            ContactKind::Email => self.email_enabled,
            ContactKind::Phone => self.sms_enabled,
        }
    }

    /// Whether issued codes are returned to the caller
    pub fn echo_codes(&self) -> bool {
        self.app_env.echoes_codes()
    }

    pub fn code_ttl_minutes(&self) -> i64 {
        self.code_ttl.num_minutes().max(1)
    }
}

/// Server dependencies, constructed once at startup and shared by handlers
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub delivery: Arc<dyn BaseCodeDelivery>,
    pub jwt_service: Arc<JwtService>,
    pub settings: AuthSettings,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        delivery: Arc<dyn BaseCodeDelivery>,
        jwt_service: Arc<JwtService>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            db_pool,
            delivery,
            jwt_service,
            settings,
        }
    }

    /// Wire up production dependencies from configuration
    pub fn from_config(db_pool: PgPool, config: &Config) -> Self {
        Self::new(
            db_pool,
            build_delivery(config),
            Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
            AuthSettings::from_config(config),
        )
    }
}
