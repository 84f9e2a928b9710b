//! Maintenance CLI for stored verification codes
//!
//! Prints one JSON object per invocation.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use companion_core::config::MAX_CODE_RETENTION_HOURS;
use companion_core::domains::auth::models::{CodeStats, VerificationCode};
use companion_core::kernel::scheduled_tasks::run_code_purge_before;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "codes_cli")]
#[command(about = "Inspect and purge stored verification codes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete codes that expired or were used before the retention window
    Purge {
        #[arg(long, default_value_t = 24)]
        retention_hours: i64,
        #[arg(long)]
        dry_run: bool,
    },

    /// Show outstanding / used / expired counts
    Stats,
}

#[derive(Serialize)]
struct PurgeResponse {
    success: bool,
    dry_run: bool,
    cutoff: chrono::DateTime<Utc>,
    count: i64,
}

#[derive(Serialize)]
struct StatsResponse {
    success: bool,
    stats: CodeStats,
}

fn output<T: Serialize>(resp: &T) -> Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

async fn connect() -> Result<PgPool> {
    let _ = dotenvy::dotenv();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Purge {
            retention_hours,
            dry_run,
        } => cmd_purge(retention_hours, dry_run).await,
        Commands::Stats => cmd_stats().await,
    }
}

async fn cmd_purge(retention_hours: i64, dry_run: bool) -> Result<()> {
    anyhow::ensure!(
        (0..=MAX_CODE_RETENTION_HOURS).contains(&retention_hours),
        "--retention-hours must be between 0 and {MAX_CODE_RETENTION_HOURS}"
    );

    let pool = connect().await?;
    let cutoff = Utc::now() - Duration::hours(retention_hours);

    let count = if dry_run {
        VerificationCode::count_stale(cutoff, &pool).await?
    } else {
        run_code_purge_before(&pool, cutoff).await? as i64
    };

    output(&PurgeResponse {
        success: true,
        dry_run,
        cutoff,
        count,
    })
}

async fn cmd_stats() -> Result<()> {
    let pool = connect().await?;
    let stats = VerificationCode::stats(Utc::now(), &pool).await?;
    output(&StatsResponse {
        success: true,
        stats,
    })
}
