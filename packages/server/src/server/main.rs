// Main entry point for API server

use anyhow::{Context, Result};
use chrono::Duration;
use companion_core::{
    kernel::{scheduled_tasks::start_scheduler, ServerDeps},
    server::{build_app, AppOptions},
    Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,companion_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pub Companion sign-in service");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        environment = %config.app_env,
        delivery_mode = config.delivery_mode.as_str(),
        email_enabled = config.email_enabled,
        sms_enabled = config.sms_enabled,
        "Configuration loaded"
    );

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match &config.code_purge_cron {
        Some(cron) => Some(
            start_scheduler(
                pool.clone(),
                cron,
                Duration::hours(config.code_retention_hours),
            )
            .await
            .context("Failed to start scheduled tasks")?,
        ),
        None => {
            tracing::info!("Verification code purge disabled");
            None
        }
    };

    let deps = ServerDeps::from_config(pool, &config);
    let app = build_app(deps, &AppOptions::from_config(&config))?;

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
