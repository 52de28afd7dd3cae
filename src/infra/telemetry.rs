use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "menu_cache_hit_total",
            Unit::Count,
            "Total number of menu cache hits."
        );
        describe_counter!(
            "menu_cache_miss_total",
            Unit::Count,
            "Total number of menu cache misses, expired entries included."
        );
        describe_counter!(
            "menu_cache_expired_total",
            Unit::Count,
            "Total number of expired entries removed on access."
        );
        describe_counter!(
            "menu_cache_invalidate_total",
            Unit::Count,
            "Total number of applied invalidation plans."
        );
        describe_counter!(
            "menu_source_failure_total",
            Unit::Count,
            "Total number of menu reads answered empty after a source failure."
        );
        describe_histogram!(
            "menu_assemble_ms",
            Unit::Milliseconds,
            "Menu tree assembly latency on cache miss in milliseconds."
        );
    });
}
