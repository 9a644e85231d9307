use crate::context::TelemetryLabels;
use metrics::Label;
use tracing::Span;

pub fn with_common_fields(span: &Span, channel_id: Option<&str>, video_id: Option<&str>) {
    if let Some(channel_id) = channel_id {
        span.record("channel_id", tracing::field::display(channel_id));
    }
    if let Some(video_id) = video_id {
        span.record("video_id", tracing::field::display(video_id));
    }
}

pub fn record_counter(name: &'static str, value: u64, labels: &TelemetryLabels) {
    metrics::counter!(name, to_labels(labels)).increment(value);
}

pub fn record_histogram(name: &'static str, value: f64, labels: &TelemetryLabels) {
    metrics::histogram!(name, to_labels(labels)).record(value);
}

fn to_labels(labels: &TelemetryLabels) -> Vec<Label> {
    labels
        .tags()
        .into_iter()
        .map(|(key, value)| Label::new(key, value))
        .collect()
}
