//! Telemetry helpers for the websub relay.
//! Installs the tracing subscriber, optionally exporting spans and the
//! relay counters over OTLP, and provides span and counter helpers keyed by
//! [`TelemetryLabels`].

mod bridge;
mod config;
mod context;
mod counters;
mod otel;
mod tracing_init;

pub use config::{TelemetryConfig, TelemetryProtocol};
pub use context::TelemetryLabels;
pub use counters::{record_counter, record_histogram, with_common_fields};
pub use otel::shutdown_telemetry;
pub use tracing_init::{init_telemetry, telemetry_enabled};

use tracing::Span;

const NOTIFICATION_SPAN_NAME: &str = "relay.notification";

/// Opens the span every inbound notification is handled in. Channel and
/// video ids are recorded later, once the feed has been decoded.
pub fn notification_span(request_id: Option<&str>) -> Span {
    tracing::info_span!(
        NOTIFICATION_SPAN_NAME,
        request_id = %request_id.unwrap_or("n/a"),
        channel_id = tracing::field::Empty,
        video_id = tracing::field::Empty,
    )
}
