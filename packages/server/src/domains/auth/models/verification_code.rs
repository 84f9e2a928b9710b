use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::VerificationCodeId;

/// A one-time sign-in code issued to a contact.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationCode {
    pub id: VerificationCodeId,
    pub contact: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl VerificationCode {
    /// Store a freshly issued code. Earlier outstanding codes for the same
    /// contact are left untouched.
    pub async fn create(
        contact: &str,
        code: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, VerificationCode>(
            r#"
            INSERT INTO verification_codes (id, contact, code, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(VerificationCodeId::new())
        .bind(contact)
        .bind(code)
        .bind(expires_at)
        .bind(issued_at)
        .fetch_one(pool)
        .await
    }

    /// Atomically consume a matching unused, unexpired code.
    ///
    /// Returns `None` when nothing matched. The candidate row is locked and
    /// `is_used = FALSE` is re-checked in the UPDATE itself, so concurrent
    /// callers can never both consume the same row. When several codes
    /// match, the newest one is consumed.
    pub async fn redeem<'e>(
        contact: &str,
        code: &str,
        now: DateTime<Utc>,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, VerificationCode>(
            r#"
            UPDATE verification_codes
            SET is_used = TRUE, used_at = $3
            WHERE id = (
                SELECT id FROM verification_codes
                WHERE contact = $1
                  AND code = $2
                  AND is_used = FALSE
                  AND expires_at > $3
                ORDER BY created_at DESC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            AND is_used = FALSE
            RETURNING *
            "#,
        )
        .bind(contact)
        .bind(code)
        .bind(now)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_id(id: VerificationCodeId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, VerificationCode>("SELECT * FROM verification_codes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of codes for `contact` that could still be redeemed at `now`
    pub async fn count_outstanding(
        contact: &str,
        now: DateTime<Utc>,
        pool: &PgPool,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM verification_codes
            WHERE contact = $1 AND is_used = FALSE AND expires_at > $2
            "#,
        )
        .bind(contact)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Delete codes that expired before `cutoff`, and used codes consumed before it
    pub async fn purge_stale(cutoff: DateTime<Utc>, pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_codes
            WHERE expires_at < $1
               OR (is_used = TRUE AND used_at < $1)
            "#,
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of rows `purge_stale(cutoff)` would delete
    pub async fn count_stale(cutoff: DateTime<Utc>, pool: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM verification_codes
            WHERE expires_at < $1
               OR (is_used = TRUE AND used_at < $1)
            "#,
        )
        .bind(cutoff)
        .fetch_one(pool)
        .await
    }

    /// Counts used by the maintenance CLI: (outstanding, used, expired)
    pub async fn stats(now: DateTime<Utc>, pool: &PgPool) -> sqlx::Result<CodeStats> {
        sqlx::query_as::<_, CodeStats>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_used = FALSE AND expires_at > $1) AS outstanding,
                COUNT(*) FILTER (WHERE is_used = TRUE) AS used,
                COUNT(*) FILTER (WHERE is_used = FALSE AND expires_at <= $1) AS expired
            FROM verification_codes
            "#,
        )
        .bind(now)
        .fetch_one(pool)
        .await
    }
}

#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct CodeStats {
    pub outstanding: i64,
    pub used: i64,
    pub expired: i64,
}
