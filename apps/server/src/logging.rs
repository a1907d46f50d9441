//! Logging and OpenTelemetry initialization
//!
//! Console output is human-readable or JSON, optionally mirrored to a rolling
//! file. `RUST_LOG` overrides the configured level. When enabled, spans are
//! exported over OTLP.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{Sampler, TracerProvider},
    Resource,
};
use std::fs;
use std::time::Duration;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Keeps the file writer flushing and shuts the tracer provider down on drop.
/// Must be kept alive for the duration of the program.
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
    otel_enabled: bool,
}

/// Initialize logging with full configuration support including OpenTelemetry
///
/// Sets up, from `LoggingConfig`:
/// - JSON or human-readable console output
/// - File logging with rotation (daily, hourly, minutely, never)
/// - `RUST_LOG` overrides of the configured level
/// - OTLP span export when `opentelemetry_enabled` is set
///
/// An OTLP exporter that fails to start is logged and skipped; the server
/// still runs with local logging.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<TelemetryGuard> {
    // Initialize OpenTelemetry tracer provider (if enabled)
    let mut otel_init_error: Option<String> = None;
    let tracer_provider = if config.opentelemetry_enabled {
        match init_tracer_provider(config) {
            Ok(provider) => Some(provider),
            Err(e) => {
                otel_init_error = Some(e.to_string());
                None
            }
        }
    } else {
        None
    };

    let env_filter = build_env_filter(config);

    // Initialize subscriber with or without OpenTelemetry
    let file_guard = if let Some(provider) = &tracer_provider {
        let otel_layer = tracing_opentelemetry::layer()
            .with_tracer(provider.tracer("bedfinder-server"))
            .with_tracked_inactivity(true);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(otel_layer);
        init_fmt_layers(subscriber, config)?
    } else {
        let subscriber = tracing_subscriber::registry().with(env_filter);
        init_fmt_layers(subscriber, config)?
    };

    // Set global tracer provider
    let otel_enabled = tracer_provider.is_some();
    if let Some(provider) = tracer_provider {
        global::set_tracer_provider(provider);
    }

    // Only reportable once a subscriber exists.
    if let Some(err) = otel_init_error {
        tracing::warn!(
            error = %err,
            "Failed to initialize OpenTelemetry, continuing without trace export"
        );
    }

    tracing::info!(
        otel_enabled,
        json = config.json,
        file = config.file_enabled,
        service_name = %config.service_name,
        environment = %config.deployment_environment,
        "Logging initialized"
    );

    Ok(TelemetryGuard {
        _file_guard: file_guard,
        otel_enabled,
    })
}

/// Initialize OpenTelemetry tracer provider with OTLP exporter
fn init_tracer_provider(config: &LoggingConfig) -> anyhow::Result<TracerProvider> {
    use opentelemetry_sdk::trace::Config;

    let service_version = config
        .service_version
        .clone()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    let resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", service_version),
        KeyValue::new(
            "deployment.environment",
            config.deployment_environment.clone(),
        ),
    ]);

    // Build OTLP trace exporter
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(&config.otlp_endpoint)
        .with_timeout(Duration::from_secs(config.otlp_timeout_seconds))
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to create OTLP exporter: {}", e))?;

    // Configure sampler based on sample ratio
    let sampler = if config.trace_sample_ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if config.trace_sample_ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        // ParentBased: respects the parent decision, otherwise samples by trace id
        Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            config.trace_sample_ratio,
        )))
    };

    // Batch span processor on the tokio runtime
    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_config(
            Config::default()
                .with_sampler(sampler)
                .with_resource(resource),
        )
        .build())
}

/// Build environment filter
fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Both the server binary and the core library log under the configured level;
        // sqlx is kept quiet unless something goes wrong.
        EnvFilter::new(format!(
            "bedfinder_server={level},bedfinder_core={level},tower_http=info,sqlx=warn",
            level = config.level
        ))
    })
}

/// Attach console and optional file layers in the configured format, then
/// install the subscriber globally.
fn init_fmt_layers<S>(subscriber: S, config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>>
where
    S: SubscriberExt + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    match (config.json, config.file_enabled) {
        (true, true) => {
            // Console + File logging (JSON)
            let (writer, guard) = create_file_appender(config)?;
            subscriber
                .with(fmt::layer().json().with_current_span(true).with_span_list(false))
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        (true, false) => {
            // Console only (JSON)
            subscriber
                .with(fmt::layer().json().with_current_span(true).with_span_list(false))
                .init();
            Ok(None)
        }
        (false, true) => {
            // Console + File logging (human-readable)
            let (writer, guard) = create_file_appender(config)?;
            subscriber
                .with(fmt::layer().with_target(true))
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        (false, false) => {
            // Console only (human-readable)
            subscriber.with(fmt::layer().with_target(true)).init();
            Ok(None)
        }
    }
}

/// Create file appender with rotation
fn create_file_appender(config: &LoggingConfig) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    // Create log directory if it doesn't exist
    fs::create_dir_all(&config.file_directory)?;

    let directory = &config.file_directory;
    let prefix = &config.file_prefix;
    // Unknown rotations are rejected by config validation; daily is the default.
    let appender = match config.file_rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(directory, prefix),
        "minutely" => tracing_appender::rolling::minutely(directory, prefix),
        "never" => tracing_appender::rolling::never(directory, format!("{prefix}.log")),
        _ => tracing_appender::rolling::daily(directory, prefix),
    };

    // Use non-blocking writer to avoid blocking on I/O
    Ok(tracing_appender::non_blocking(appender))
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // Flush pending spans before exit
        if self.otel_enabled {
            global::shutdown_tracer_provider();
        }
    }
}
