//! OTLP export of relay spans and counters.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace::{SdkTracer, SdkTracerProvider},
};

use crate::bridge::OtelRecorder;
use crate::config::{TelemetryConfig, TelemetryProtocol};

const METRIC_EXPORT_INTERVAL: Duration = Duration::from_secs(15);

static PROVIDERS: Mutex<Option<Providers>> = Mutex::new(None);

struct Providers {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
}

/// Builds both OTLP pipelines, registers them globally and routes the
/// `metrics` facade into the meter. Returns the tracer for the subscriber
/// layer.
pub(crate) fn install(cfg: &TelemetryConfig) -> Result<SdkTracer> {
    let resource = Resource::builder_empty()
        .with_service_name(cfg.service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", cfg.service_version.clone()),
            KeyValue::new("deployment.environment", cfg.environment.clone()),
        ])
        .build();

    let span_exporter = match cfg.protocol {
        TelemetryProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(cfg.endpoint.clone())
            .build(),
        TelemetryProtocol::HttpProtobuf => SpanExporter::builder()
            .with_http()
            .with_endpoint(cfg.endpoint.clone())
            .build(),
    }
    .context("build OTLP span exporter")?;

    let metric_exporter = match cfg.protocol {
        TelemetryProtocol::Grpc => MetricExporter::builder()
            .with_tonic()
            .with_endpoint(cfg.endpoint.clone())
            .build(),
        TelemetryProtocol::HttpProtobuf => MetricExporter::builder()
            .with_http()
            .with_endpoint(cfg.endpoint.clone())
            .build(),
    }
    .context("build OTLP metric exporter")?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();
    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(
            PeriodicReader::builder(metric_exporter)
                .with_interval(METRIC_EXPORT_INTERVAL)
                .build(),
        )
        .build();

    let tracer = tracer_provider.tracer(cfg.service_name.clone());
    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    let recorder = OtelRecorder::new(global::meter("websub-relay"));
    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("a metrics recorder is already installed; relay counters stay local");
    }

    if let Ok(mut slot) = PROVIDERS.lock() {
        *slot = Some(Providers {
            tracer: tracer_provider,
            meter: meter_provider,
        });
    }
    Ok(tracer)
}

/// Flushes pending spans and metrics. No-op when export is disabled.
pub fn shutdown_telemetry() {
    let providers = PROVIDERS.lock().ok().and_then(|mut slot| slot.take());
    let Some(providers) = providers else {
        return;
    };
    if let Err(err) = providers.meter.shutdown() {
        tracing::warn!(error = %err, "meter provider shutdown failed");
    }
    if let Err(err) = providers.tracer.shutdown() {
        tracing::warn!(error = %err, "tracer provider shutdown failed");
    }
}
