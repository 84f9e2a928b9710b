use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    environment: &'static str,
    database: DatabaseHealth,
    connection_pool: ConnectionPoolHealth,
    services: ServicesHealth,
    features: FeatureFlags,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ConnectionPoolHealth {
    size: u32,
    idle_connections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_connections: Option<u32>,
}

#[derive(Serialize)]
pub struct ServicesHealth {
    email: &'static str,
    sms: &'static str,
    delivery_mode: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    email_verification: bool,
    sms_verification: bool,
}

fn configured(is_configured: bool) -> &'static str {
    if is_configured {
        "configured"
    } else {
        "not_configured"
    }
}

/// Health check endpoint
///
/// Checks database connectivity and reports configured delivery providers.
/// Returns 200 OK if the database is reachable, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let pool = &state.deps.db_pool;
    let settings = &state.deps.settings;

    let db_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        sqlx::query("SELECT 1").execute(pool),
    )
    .await
    {
        Ok(Ok(_)) => DatabaseHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => DatabaseHealth {
            status: "error".to_string(),
            error: Some(format!("Query failed: {}", e)),
        },
        Err(_) => DatabaseHealth {
            status: "error".to_string(),
            error: Some("Query timeout (>5s)".to_string()),
        },
    };

    let pool_health = ConnectionPoolHealth {
        size: pool.size(),
        idle_connections: pool.num_idle(),
        max_connections: Some(pool.options().get_max_connections()),
    };

    let is_healthy = db_health.status == "ok";
    if !is_healthy {
        tracing::warn!(error = ?db_health.error, "Health check failed");
    }

    let (overall_status, status_code) = if is_healthy {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            timestamp: Utc::now(),
            environment: settings.app_env.as_str(),
            database: db_health,
            connection_pool: pool_health,
            services: ServicesHealth {
                email: configured(settings.email_provider_configured),
                sms: configured(settings.sms_provider_configured),
                delivery_mode: settings.delivery_mode.as_str(),
            },
            features: FeatureFlags {
                email_verification: settings.email_enabled,
                sms_verification: settings.sms_enabled,
            },
        }),
    )
}
