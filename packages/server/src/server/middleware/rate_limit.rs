// Rate limiting using tower-governor
//
// Applied in app.rs to the code issuance and verification routes only.
// Keys on X-Forwarded-For / X-Real-IP / Forwarded, then the peer address.
// `use_headers` adds x-ratelimit-* headers to responses.
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::Router;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};

use crate::config::RateLimitConfig;

/// Wrap `router` in a per-IP rate limit
pub fn rate_limited<S>(router: Router<S>, limits: &RateLimitConfig) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    // The builder takes a replenish interval, not a rate
    let replenish_ms = (1000 / limits.per_second.max(1)).max(1);

    let config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(limits.burst)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .ok_or_else(|| anyhow!("Invalid rate limit configuration: {:?}", limits))?;

    tracing::info!(
        per_second = limits.per_second,
        burst = limits.burst,
        "Rate limiting code endpoints"
    );

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}
