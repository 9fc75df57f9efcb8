use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::page::{PAGE_LOAD_MISS_TOTAL, PAGE_SAVE_FAILED_TOTAL, PAGE_SAVE_TOTAL};
use crate::config::{LogFormat, LoggingSettings};
use crate::presentation::views::RENDER_MS;

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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            PAGE_SAVE_TOTAL,
            Unit::Count,
            "Total number of pages written to storage."
        );
        describe_counter!(
            PAGE_SAVE_FAILED_TOTAL,
            Unit::Count,
            "Total number of page writes that failed."
        );
        describe_counter!(
            PAGE_LOAD_MISS_TOTAL,
            Unit::Count,
            "Total number of page loads for titles with no stored file."
        );
        describe_histogram!(
            RENDER_MS,
            Unit::Milliseconds,
            "Template rendering latency in milliseconds."
        );
    });
}
