//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Currently a single maintenance job: deleting verification codes that
//! expired (or were used) longer ago than the retention window.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::auth::models::VerificationCode;

/// Start the code purge job on `cron` (six-field cron expression)
pub async fn start_scheduler(
    pool: PgPool,
    cron: &str,
    retention: Duration,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let purge_job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = pool.clone();
        Box::pin(async move {
            if let Err(e) = run_code_purge(&pool, retention).await {
                tracing::error!("Verification code purge failed: {}", e);
            }
        })
    })?;

    scheduler.add(purge_job).await?;
    scheduler.start().await?;

    tracing::info!(cron = %cron, "Scheduled tasks started (verification code purge)");
    Ok(scheduler)
}

/// Delete codes that are past the retention window
pub async fn run_code_purge(pool: &PgPool, retention: Duration) -> Result<u64> {
    run_code_purge_before(pool, Utc::now() - retention).await
}

/// Delete codes that expired, or were used, before `cutoff`
pub async fn run_code_purge_before(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64> {
    let deleted = VerificationCode::purge_stale(cutoff, pool).await?;

    if deleted > 0 {
        tracing::info!(deleted, "Purged stale verification codes");
    } else {
        tracing::debug!("No stale verification codes to purge");
    }

    Ok(deleted)
}
