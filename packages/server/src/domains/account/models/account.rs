use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::{AccountId, Contact};

/// Placeholder name given to accounts created by code sign-in
pub const PLACEHOLDER_DISPLAY_NAME: &str = "User";

/// Account model - SQL persistence layer
///
/// Code sign-in populates exactly one of `email` / `phone`.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: String,
    pub auth_provider: String,
    pub is_verified: bool,

    // Profile
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of an account returned after sign-in
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: AccountId,
    pub contact: String,
    pub display_name: String,
    pub is_verified: bool,
}

/// Validated profile changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub display_name: String,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

impl Account {
    /// The contact this account signs in with (email preferred)
    pub fn contact(&self) -> &str {
        self.email
            .as_deref()
            .or(self.phone.as_deref())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            contact: self.contact().to_string(),
            display_name: self.display_name.clone(),
            is_verified: self.is_verified,
        }
    }

    /// Find account by ID
    pub async fn find_by_id(id: AccountId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find account by its email or phone
    pub async fn find_by_contact(contact: &Contact, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        let sql = match contact {
            Contact::Email(_) => "SELECT * FROM accounts WHERE email = $1",
            Contact::Phone(_) => "SELECT * FROM accounts WHERE phone = $1",
        };
        sqlx::query_as::<_, Self>(sql)
            .bind(contact.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Find-or-create the account for a contact that just proved ownership.
    ///
    /// New accounts start verified with the placeholder display name;
    /// existing accounts are marked verified.
    pub async fn resolve_verified<'e>(
        contact: &Contact,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Self> {
        let (sql, auth_provider) = match contact {
            Contact::Email(_) => (
                r#"
                INSERT INTO accounts (id, email, display_name, auth_provider, is_verified)
                VALUES ($1, $2, $3, $4, TRUE)
                ON CONFLICT (email) DO UPDATE
                    SET is_verified = TRUE, updated_at = NOW()
                RETURNING *
                "#,
                "email",
            ),
            Contact::Phone(_) => (
                r#"
                INSERT INTO accounts (id, phone, display_name, auth_provider, is_verified)
                VALUES ($1, $2, $3, $4, TRUE)
                ON CONFLICT (phone) DO UPDATE
                    SET is_verified = TRUE, updated_at = NOW()
                RETURNING *
                "#,
                "phone",
            ),
        };

        sqlx::query_as::<_, Self>(sql)
            .bind(AccountId::new())
            .bind(contact.as_str())
            .bind(PLACEHOLDER_DISPLAY_NAME)
            .bind(auth_provider)
            .fetch_one(executor)
            .await
    }

    /// Apply profile changes; absent optional fields keep their stored value.
    /// Returns `None` if the account no longer exists.
    pub async fn update_profile(
        id: AccountId,
        changes: &ProfileChanges,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE accounts
            SET display_name = $2,
                age = COALESCE($3, age),
                weight = COALESCE($4, weight),
                gender = COALESCE($5, gender),
                avatar_url = COALESCE($6, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.display_name)
        .bind(changes.age)
        .bind(changes.weight)
        .bind(&changes.gender)
        .bind(&changes.avatar_url)
        .fetch_optional(pool)
        .await
    }
}
