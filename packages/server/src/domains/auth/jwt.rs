use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::Result, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::AccountId;

/// Session lifetime
pub const SESSION_TTL_DAYS: i64 = 30;

/// JWT Claims - data stored in the session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,              // Subject (account id as string)
    pub account_id: AccountId,    // Account UUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,    // Verified phone, when signed in by SMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,    // Verified email, when signed in by email
    pub exp: i64,                 // Expiration timestamp
    pub iat: i64,                 // Issued at timestamp
    pub iss: String,              // Issuer
    pub jti: String,              // JWT ID (unique token identifier)
}

/// JWT Service - creates and verifies session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Create new JWT service with secret and issuer
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a session token for an account, valid for 30 days
    pub fn create_token(
        &self,
        account_id: AccountId,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<String> {
        self.create_token_at(account_id, email, phone, Utc::now())
    }

    pub fn create_token_at(
        &self,
        account_id: AccountId,
        email: Option<String>,
        phone: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let exp = now + Duration::days(SESSION_TTL_DAYS);

        let claims = Claims {
            sub: account_id.to_string(),
            account_id,
            phone,
            email,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verify and decode a session token
    ///
    /// Returns claims if the token is valid, unexpired and from this issuer
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}
