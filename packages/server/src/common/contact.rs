//! Contact addresses (email or phone) used to sign in.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?)*\.[a-z]{2,}$")
            .expect("email regex is valid");
}

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Phone,
}

impl ContactKind {
    /// Delivery channel name as shown to users
    pub fn channel(&self) -> &'static str {
        match self {
            ContactKind::Email => "email",
            ContactKind::Phone => "sms",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactKind::Email => "Email",
            ContactKind::Phone => "SMS",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Contact is required")]
    Empty,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid phone number")]
    InvalidPhone,
}

/// A normalized contact address.
///
/// Emails are lower-cased; phone numbers are reduced to `+` followed by digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Contact {
    Email(String),
    Phone(String),
}

impl Contact {
    /// Parse user input. Anything containing `@` is treated as an email.
    pub fn parse(input: &str) -> Result<Self, ContactError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ContactError::Empty);
        }

        if trimmed.contains('@') {
            Self::parse_email(trimmed)
        } else {
            Self::parse_phone(trimmed)
        }
    }

    pub fn parse_email(input: &str) -> Result<Self, ContactError> {
        let email = input.trim().to_lowercase();
        if email.is_empty() {
            return Err(ContactError::Empty);
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(Contact::Email(email))
    }

    pub fn parse_phone(input: &str) -> Result<Self, ContactError> {
        let stripped: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if stripped.is_empty() {
            return Err(ContactError::Empty);
        }

        let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ContactError::InvalidPhone);
        }
        if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
            return Err(ContactError::InvalidPhone);
        }

        Ok(Contact::Phone(format!("+{}", digits)))
    }

    pub fn kind(&self) -> ContactKind {
        match self {
            Contact::Email(_) => ContactKind::Email,
            Contact::Phone(_) => ContactKind::Phone,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Contact::Email(value) | Contact::Phone(value) => value,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Contact::Email(value) => Some(value),
            Contact::Phone(_) => None,
        }
    }

    pub fn phone(&self) -> Option<&str> {
        match self {
            Contact::Phone(value) => Some(value),
            Contact::Email(_) => None,
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
