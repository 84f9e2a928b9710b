use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;

/// Deployment environment. Controls whether issued codes are echoed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl AppEnv {
    /// Raw codes are returned in API responses only outside production.
    pub fn echoes_codes(&self) -> bool {
        !matches!(self, AppEnv::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Test => "test",
            AppEnv::Production => "production",
        }
    }
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "test" => Ok(AppEnv::Test),
            "production" | "prod" => Ok(AppEnv::Production),
            other => bail!("APP_ENV must be development, test or production (got {other:?})"),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How verification codes leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Send through Twilio (SMS) and Resend (email)
    Live,
    /// Write codes to the log only
    Log,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Live => "live",
            DeliveryMode::Log => "log",
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(DeliveryMode::Live),
            "log" => Ok(DeliveryMode::Log),
            other => bail!("DELIVERY_MODE must be live or log (got {other:?})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst: u32,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub app_env: AppEnv,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub delivery_mode: DeliveryMode,
    pub twilio: Option<TwilioConfig>,
    pub resend: Option<ResendConfig>,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub code_ttl_secs: i64,
    /// `None` disables the expired-code sweep
    pub code_purge_cron: Option<String>,
    pub code_retention_hours: i64,
    pub rate_limit: Option<RateLimitConfig>,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

const MIN_JWT_SECRET_LEN: usize = 32;
pub const MAX_CODE_TTL_SECS: i64 = 24 * 60 * 60;
pub const MAX_CODE_RETENTION_HOURS: i64 = 10 * 365 * 24;
const DEFAULT_RESEND_FROM: &str = "Pub Companion <onboarding@resend.dev>";
const DEFAULT_PURGE_CRON: &str = "0 0 * * * *";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_env: AppEnv = var("APP_ENV")
            .as_deref()
            .unwrap_or("development")
            .parse()?;

        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters");
        }

        let delivery_mode = match var("DELIVERY_MODE") {
            Some(mode) => mode.parse()?,
            None if app_env == AppEnv::Production => DeliveryMode::Live,
            None => DeliveryMode::Log,
        };

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(phone_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                phone_number,
            }),
            _ => None,
        };

        let resend = var("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            from: var("RESEND_FROM").unwrap_or_else(|| DEFAULT_RESEND_FROM.to_string()),
        });

        let rate_limit = match var("RATE_LIMIT_PER_SECOND") {
            Some(per_second) => Some(RateLimitConfig {
                per_second: per_second
                    .parse()
                    .context("RATE_LIMIT_PER_SECOND must be a positive number")?,
                burst: parse_or(var("RATE_LIMIT_BURST"), 20, "RATE_LIMIT_BURST")?,
            }),
            None => None,
        };

        let code_purge_cron = match var("CODE_PURGE_CRON") {
            Some(cron) if cron.eq_ignore_ascii_case("off") => None,
            Some(cron) => Some(cron),
            None => Some(DEFAULT_PURGE_CRON.to_string()),
        };

        let config = Self {
            database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or(var("PORT"), 8080, "PORT")?,
            app_env,
            jwt_secret,
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| "pub-companion".to_string()),
            delivery_mode,
            twilio,
            resend,
            email_enabled: parse_or(var("ENABLE_EMAIL_VERIFICATION"), true, "ENABLE_EMAIL_VERIFICATION")?,
            sms_enabled: parse_or(var("ENABLE_SMS_VERIFICATION"), true, "ENABLE_SMS_VERIFICATION")?,
            code_ttl_secs: parse_or(var("CODE_TTL_SECS"), 600, "CODE_TTL_SECS")?,
            code_purge_cron,
            code_retention_hours: parse_or(var("CODE_RETENTION_HOURS"), 24, "CODE_RETENTION_HOURS")?,
            rate_limit,
            allowed_origins: var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would ship a non-functional or leaky delivery path.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CODE_TTL_SECS).contains(&self.code_ttl_secs) {
            bail!("CODE_TTL_SECS must be between 1 and {MAX_CODE_TTL_SECS}");
        }
        if !(0..=MAX_CODE_RETENTION_HOURS).contains(&self.code_retention_hours) {
            bail!("CODE_RETENTION_HOURS must be between 0 and {MAX_CODE_RETENTION_HOURS}");
        }
        if let Some(limits) = &self.rate_limit {
            if limits.per_second == 0 || limits.burst == 0 {
                bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be positive");
            }
        }

        match self.delivery_mode {
            DeliveryMode::Log if self.app_env == AppEnv::Production => {
                bail!("DELIVERY_MODE=log is not allowed when APP_ENV=production");
            }
            DeliveryMode::Live => {
                if self.sms_enabled && self.twilio.is_none() {
                    bail!("SMS verification is enabled with DELIVERY_MODE=live but TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER are not all set");
                }
                if self.email_enabled && self.resend.is_none() {
                    bail!("Email verification is enabled with DELIVERY_MODE=live but RESEND_API_KEY is not set");
                }
            }
            DeliveryMode::Log => {}
        }

        Ok(())
    }
}

fn parse_or<T>(value: Option<String>, default: T, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgres://localhost/companion"),
            ("JWT_SECRET", SECRET),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&base()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.delivery_mode, DeliveryMode::Log);
        assert_eq!(config.code_ttl_secs, 600);
        assert_eq!(config.code_purge_cron.as_deref(), Some("0 0 * * * *"));
        assert!(config.email_enabled);
        assert!(config.sms_enabled);
        assert!(config.rate_limit.is_none());
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/companion"),
            ("JWT_SECRET", "short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[("JWT_SECRET", SECRET)]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_production_defaults_to_live_and_requires_providers() {
        let mut vars = base();
        vars.push(("APP_ENV", "production"));
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("TWILIO"));

        vars.extend([
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_PHONE_NUMBER", "+15005550006"),
            ("RESEND_API_KEY", "re_123"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.delivery_mode, DeliveryMode::Live);
        assert!(!config.app_env.echoes_codes());
        assert_eq!(
            config.resend.unwrap().from,
            "Pub Companion <onboarding@resend.dev>"
        );
    }

    #[test]
    fn test_log_mode_refused_in_production() {
        let mut vars = base();
        vars.push(("APP_ENV", "production"));
        vars.push(("DELIVERY_MODE", "log"));
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("DELIVERY_MODE=log"));
    }

    #[test]
    fn test_live_mode_only_checks_enabled_channels() {
        let mut vars = base();
        vars.extend([
            ("DELIVERY_MODE", "live"),
            ("ENABLE_SMS_VERIFICATION", "false"),
            ("RESEND_API_KEY", "re_123"),
        ]);
        let config = load(&vars).unwrap();
        assert!(!config.sms_enabled);
        assert!(config.twilio.is_none());
    }

    #[test]
    fn test_partial_twilio_credentials_are_ignored() {
        let mut vars = base();
        vars.push(("TWILIO_ACCOUNT_SID", "AC123"));
        let config = load(&vars).unwrap();
        assert!(config.twilio.is_none());
    }

    #[test]
    fn test_purge_cron_off() {
        let mut vars = base();
        vars.push(("CODE_PURGE_CRON", "off"));
        assert!(load(&vars).unwrap().code_purge_cron.is_none());
    }

    #[test]
    fn test_rate_limit_and_origins() {
        let mut vars = base();
        vars.extend([
            ("RATE_LIMIT_PER_SECOND", "5"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example ,"),
        ]);
        let config = load(&vars).unwrap();
        let limit = config.rate_limit.unwrap();
        assert_eq!(limit.per_second, 5);
        assert_eq!(limit.burst, 20);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = base();
        vars.push(("PORT", "eighty"));
        assert!(load(&vars).unwrap_err().to_string().contains("PORT"));

        let mut vars = base();
        vars.push(("APP_ENV", "staging"));
        assert!(load(&vars).is_err());

        let mut vars = base();
        vars.push(("CODE_TTL_SECS", "0"));
        assert!(load(&vars).is_err());

        let mut vars = base();
        vars.push(("RATE_LIMIT_PER_SECOND", "0"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_code_ttl_upper_bound() {
        let mut vars = base();
        vars.push(("CODE_TTL_SECS", "86400"));
        assert_eq!(load(&vars).unwrap().code_ttl_secs, 86_400);

        let mut vars = base();
        vars.push(("CODE_TTL_SECS", "86401"));
        assert!(load(&vars).unwrap_err().to_string().contains("CODE_TTL_SECS"));

        let mut vars = base();
        vars.push(("CODE_TTL_SECS", "100000000000000"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_code_retention_bounds() {
        let mut vars = base();
        vars.push(("CODE_RETENTION_HOURS", "87600"));
        assert_eq!(load(&vars).unwrap().code_retention_hours, 87_600);

        for bad in ["87601", "-1", "9000000000000000"] {
            let mut vars = base();
            vars.push(("CODE_RETENTION_HOURS", bad));
            assert!(
                load(&vars).unwrap_err().to_string().contains("CODE_RETENTION_HOURS"),
                "{bad} should be rejected"
            );
        }
    }
}
