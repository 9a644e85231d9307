use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;
use crate::otel;

static INIT: OnceLock<()> = OnceLock::new();
static EXPORTING: AtomicBool = AtomicBool::new(false);

/// Installs the global subscriber, plus OTLP export of spans and relay
/// counters when enabled. Later calls are ignored.
pub fn init_telemetry(cfg: TelemetryConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let fmt_layer = if cfg.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };
    let otel_layer = if cfg.exporter_enabled() {
        Some(OpenTelemetryLayer::new(otel::install(&cfg)?))
    } else {
        None
    };
    EXPORTING.store(otel_layer.is_some(), Ordering::SeqCst);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .ok();

    INIT.set(()).ok();
    Ok(())
}

/// Whether spans and counters are exported over OTLP.
pub fn telemetry_enabled() -> bool {
    EXPORTING.load(Ordering::SeqCst)
}
