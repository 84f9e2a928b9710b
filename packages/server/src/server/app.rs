//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, RateLimitConfig};
use crate::kernel::ServerDeps;
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware, rate_limited};
use crate::server::routes::{
    get_profile_handler, health_handler, issue_code_handler, providers_handler,
    send_email_code_handler, send_sms_code_handler, update_profile_handler,
    verify_code_handler, verify_email_code_handler, verify_sms_code_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// HTTP-level options that do not affect sign-in semantics
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub rate_limit: Option<RateLimitConfig>,
}

impl AppOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            rate_limit: config.rate_limit,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, options: &AppOptions) -> Result<Router> {
    let deps = Arc::new(deps);
    let app_state = AppState { deps: deps.clone() };

    // Code issuance and verification, optionally rate limited per IP
    let mut code_routes = Router::new()
        .route("/issue-code", post(issue_code_handler))
        .route("/verify-code", post(verify_code_handler))
        .route("/auth/send-email-code", post(send_email_code_handler))
        .route("/auth/send-sms-code", post(send_sms_code_handler))
        .route("/auth/verify-email-code", post(verify_email_code_handler))
        .route("/auth/verify-sms-code", post(verify_sms_code_handler));

    if let Some(limits) = &options.rate_limit {
        code_routes = rate_limited(code_routes, limits)?;
    }

    let jwt_service = deps.jwt_service.clone();

    let app = Router::new()
        .merge(code_routes)
        .route("/auth/providers", get(providers_handler))
        .route(
            "/users/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(app_state))
        .layer(cors_layer(&options.allowed_origins)?)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
