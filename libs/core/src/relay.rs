//! The notification pipeline: decode, translate, encode, deliver.

use std::sync::Arc;

use tracing::Span;
use wsr_telemetry::{TelemetryLabels, record_counter, with_common_fields};

use crate::discord::{ChatSink, DeliveryReceipt};
use crate::error::RelayError;
use crate::feed::decode_feed;
use crate::translator::NotificationTranslator;

const RELAYED_COUNTER: &str = "notifications_relayed";
const SOURCE: &str = "youtube";

#[derive(Clone)]
pub struct NotificationRelay {
    translator: NotificationTranslator,
    sink: Arc<dyn ChatSink>,
}

impl NotificationRelay {
    pub fn new(translator: NotificationTranslator, sink: Arc<dyn ChatSink>) -> Self {
        Self { translator, sink }
    }

    /// Handles one content notification. Exactly one delivery is attempted
    /// when the body decodes; nothing is sent otherwise. The returned receipt
    /// is diagnostic only and never reaches the webhook caller.
    pub async fn handle_notification(&self, body: &[u8]) -> Result<DeliveryReceipt, RelayError> {
        let feed = decode_feed(body)?;
        let entry = feed.entry();
        with_common_fields(
            &Span::current(),
            entry.map(|e| e.channel_id.as_str()),
            entry.map(|e| e.video_id.as_str()),
        );
        for deleted in &feed.deleted_entries {
            tracing::info!(
                reference = %deleted.reference,
                when = %deleted.when,
                "feed carries deleted entry"
            );
        }
        if entry.is_none() {
            tracing::warn!("feed has no entry; relaying empty message");
        }

        let message = self.translator.to_message(&feed);
        let payload = self.translator.encode(&message)?;
        let receipt = self.sink.deliver(payload).await?;

        let labels = TelemetryLabels {
            channel_id: entry.map(|e| e.channel_id.clone()),
            ..TelemetryLabels::new(SOURCE)
        }
        .with_extra("status", receipt.status.to_string());
        record_counter(RELAYED_COUNTER, 1, &labels);

        if receipt.is_success() {
            tracing::info!(
                status = receipt.status,
                response = %receipt.body,
                "discord accepted message"
            );
        } else {
            tracing::warn!(
                status = receipt.status,
                response = %receipt.body,
                "discord rejected message"
            );
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingSink {
        payloads: Mutex<Vec<Vec<u8>>>,
        status: u16,
    }

    impl RecordingSink {
        fn with_status(status: u16) -> Self {
            Self {
                payloads: Mutex::default(),
                status,
            }
        }

        fn payloads(&self) -> Vec<serde_json::Value> {
            self.payloads
                .lock()
                .unwrap()
                .iter()
                .map(|p| serde_json::from_slice(p).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl ChatSink for RecordingSink {
        async fn deliver(&self, payload: Vec<u8>) -> Result<DeliveryReceipt, RelayError> {
            self.payloads.lock().unwrap().push(payload);
            Ok(DeliveryReceipt {
                status: self.status,
                body: r#"{"id":"42"}"#.into(),
            })
        }
    }

    const NOTIFICATION: &str = r#"<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <title>YouTube video feed</title>
  <entry>
    <id>yt:video:abc123</id>
    <yt:videoId>abc123</yt:videoId>
    <yt:channelId>UCacme</yt:channelId>
    <title>New Release</title>
    <link rel="alternate" href="https://example.com/v"/>
    <author><name>Acme</name><uri>https://www.youtube.com/channel/UCacme</uri></author>
  </entry>
</feed>"#;

    fn relay_with(sink: Arc<RecordingSink>) -> NotificationRelay {
        NotificationRelay::new(NotificationTranslator::new("https://cdn.example.com/t.png"), sink)
    }

    #[tokio::test]
    async fn valid_notification_is_delivered_once() {
        let sink = Arc::new(RecordingSink::with_status(200));
        let relay = relay_with(sink.clone());

        let receipt = relay
            .handle_notification(NOTIFICATION.as_bytes())
            .await
            .expect("relay");
        assert_eq!(receipt.status, 200);

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["content"], "Acme Just Posted a Video!");
        assert_eq!(payloads[0]["embed"]["title"], "New Release");
        assert_eq!(payloads[0]["embed"]["url"], "https://example.com/v");
        assert_eq!(payloads[0]["embed"]["image"]["url"], "https://cdn.example.com/t.png");
    }

    #[tokio::test]
    async fn malformed_notification_sends_nothing() {
        let sink = Arc::new(RecordingSink::with_status(200));
        let relay = relay_with(sink.clone());

        let err = relay
            .handle_notification(b"<feed><entry></feed>")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert!(sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn repeated_notifications_are_not_deduplicated() {
        let sink = Arc::new(RecordingSink::with_status(200));
        let relay = relay_with(sink.clone());

        relay.handle_notification(NOTIFICATION.as_bytes()).await.unwrap();
        relay.handle_notification(NOTIFICATION.as_bytes()).await.unwrap();

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0], payloads[1]);
    }

    #[tokio::test]
    async fn empty_feed_still_relays_message() {
        let sink = Arc::new(RecordingSink::with_status(200));
        let relay = relay_with(sink.clone());

        relay.handle_notification(b"<feed></feed>").await.unwrap();
        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["content"], " Just Posted a Video!");
    }

    #[test]
    fn relayed_notification_is_counted_with_status() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let relay = relay_with(Arc::new(RecordingSink::with_status(204)));

        metrics::with_local_recorder(&recorder, || {
            runtime
                .block_on(relay.handle_notification(NOTIFICATION.as_bytes()))
                .expect("relay");
        });

        let relayed: Vec<_> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, _, _, _)| key.key().name() == "notifications_relayed")
            .collect();
        assert_eq!(relayed.len(), 1);
        let (key, _, _, value) = &relayed[0];
        let labels: Vec<(&str, &str)> = key
            .key()
            .labels()
            .map(|l| (l.key(), l.value()))
            .collect();
        assert_eq!(
            labels,
            vec![("source", "youtube"), ("channel_id", "UCacme"), ("status", "204")]
        );
        assert_eq!(value, &DebugValue::Counter(1));
    }

    #[tokio::test]
    #[traced_test]
    async fn rejected_delivery_is_logged() {
        let sink = Arc::new(RecordingSink::with_status(401));
        let relay = relay_with(sink);

        let receipt = relay
            .handle_notification(NOTIFICATION.as_bytes())
            .await
            .expect("relay");
        assert!(!receipt.is_success());
        assert!(logs_contain("discord rejected message"));
    }
}
