//! Update profile action

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::common::AccountId;
use crate::domains::account::models::{Account, ProfileChanges};

const NAME_MAX_CHARS: usize = 100;
const AGE_RANGE: std::ops::RangeInclusive<i32> = 18..=120;
const WEIGHT_MAX: f64 = 500.0;
const GENDERS: [&str; 3] = ["male", "female", "other"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub name: String,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("{message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

fn invalid(field: &'static str, message: &'static str) -> ProfileError {
    ProfileError::Invalid { field, message }
}

impl UpdateProfileInput {
    /// Check field constraints and produce the changes to store
    pub fn validate(self) -> Result<ProfileChanges, ProfileError> {
        let name = self.name.trim();
        let name_len = name.chars().count();
        if name_len == 0 || name_len > NAME_MAX_CHARS {
            return Err(invalid("name", "Name must be 1-100 characters"));
        }

        if let Some(age) = self.age {
            if !AGE_RANGE.contains(&age) {
                return Err(invalid("age", "Age must be between 18 and 120"));
            }
        }

        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight <= 0.0 || weight > WEIGHT_MAX {
                return Err(invalid("weight", "Weight must be positive and at most 500"));
            }
        }

        if let Some(gender) = self.gender.as_deref() {
            if !GENDERS.contains(&gender) {
                return Err(invalid("gender", "Gender must be male, female or other"));
            }
        }

        if let Some(avatar_url) = self.avatar_url.as_deref() {
            let valid = url::Url::parse(avatar_url)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
                .unwrap_or(false);
            if !valid {
                return Err(invalid("avatarUrl", "Avatar URL must be an http(s) URL"));
            }
        }

        Ok(ProfileChanges {
            display_name: name.to_string(),
            age: self.age,
            weight: self.weight,
            gender: self.gender,
            avatar_url: self.avatar_url,
        })
    }
}

/// Validate and apply a profile update for the signed-in account.
pub async fn update_profile(
    account_id: AccountId,
    input: UpdateProfileInput,
    pool: &PgPool,
) -> Result<Account, ProfileError> {
    let changes = input.validate()?;

    let account = Account::update_profile(account_id, &changes, pool)
        .await?
        .ok_or(ProfileError::NotFound)?;

    info!(account_id = %account.id, "Profile updated");
    Ok(account)
}
