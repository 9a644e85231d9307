/// Labels attached to relay counters and spans.
#[derive(Debug, Clone, Default)]
pub struct TelemetryLabels {
    pub source: String,
    pub channel_id: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl TelemetryLabels {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Flattens the labels into `(key, value)` pairs, skipping unset fields.
    pub fn tags(&self) -> Vec<(String, String)> {
        let mut tags = Vec::with_capacity(2 + self.extra.len());
        tags.push(("source".into(), self.source.clone()));
        if let Some(channel) = &self.channel_id {
            tags.push(("channel_id".into(), channel.clone()));
        }
        for (key, value) in &self.extra {
            tags.push((key.clone(), value.clone()));
        }
        tags
    }
}
