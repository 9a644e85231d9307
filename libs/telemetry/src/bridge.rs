//! Forwards `metrics` facade calls to an OpenTelemetry meter, so counters
//! recorded with [`crate::record_counter`] end up in the OTLP export.

use std::sync::{Arc, Mutex};

use metrics::{
    Counter, CounterFn, Gauge, GaugeFn, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};
use opentelemetry::KeyValue;
use opentelemetry::metrics::Meter;

pub(crate) struct OtelRecorder {
    meter: Meter,
}

impl OtelRecorder {
    pub(crate) fn new(meter: Meter) -> Self {
        Self { meter }
    }
}

pub(crate) fn key_attributes(key: &Key) -> Vec<KeyValue> {
    key.labels()
        .map(|label| KeyValue::new(label.key().to_string(), label.value().to_string()))
        .collect()
}

struct OtelCounter {
    inner: opentelemetry::metrics::Counter<u64>,
    attributes: Vec<KeyValue>,
}

impl CounterFn for OtelCounter {
    fn increment(&self, value: u64) {
        self.inner.add(value, &self.attributes);
    }

    // OTel counters are monotonic sums; an absolute value cannot be expressed.
    fn absolute(&self, _value: u64) {}
}

struct OtelHistogram {
    inner: opentelemetry::metrics::Histogram<f64>,
    attributes: Vec<KeyValue>,
}

impl HistogramFn for OtelHistogram {
    fn record(&self, value: f64) {
        self.inner.record(value, &self.attributes);
    }
}

struct OtelGauge {
    inner: opentelemetry::metrics::Gauge<f64>,
    attributes: Vec<KeyValue>,
    current: Mutex<f64>,
}

impl OtelGauge {
    fn update(&self, apply: impl FnOnce(f64) -> f64) {
        if let Ok(mut current) = self.current.lock() {
            *current = apply(*current);
            self.inner.record(*current, &self.attributes);
        }
    }
}

impl GaugeFn for OtelGauge {
    fn increment(&self, value: f64) {
        self.update(|current| current + value);
    }

    fn decrement(&self, value: f64) {
        self.update(|current| current - value);
    }

    fn set(&self, value: f64) {
        self.update(|_| value);
    }
}

impl Recorder for OtelRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(OtelCounter {
            inner: self.meter.u64_counter(key.name().to_string()).build(),
            attributes: key_attributes(key),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(OtelGauge {
            inner: self.meter.f64_gauge(key.name().to_string()).build(),
            attributes: key_attributes(key),
            current: Mutex::new(0.0),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(OtelHistogram {
            inner: self.meter.f64_histogram(key.name().to_string()).build(),
            attributes: key_attributes(key),
        }))
    }
}
