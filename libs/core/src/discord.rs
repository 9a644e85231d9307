//! Delivery of encoded messages to the Discord channel messages endpoint.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use wsr_telemetry::{TelemetryLabels, record_histogram};

use crate::config::RelayConfig;
use crate::error::RelayError;

const API_VERSION_PATH: &str = "api/v8";
const REQUEST_SECONDS: &str = "discord_request_seconds";

/// Status and raw body returned by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: String,
}

impl DeliveryReceipt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Destination for encoded chat messages.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn deliver(&self, payload: Vec<u8>) -> Result<DeliveryReceipt, RelayError>;
}

#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    url: String,
    authorization: String,
    channel_id: String,
}

impl DiscordClient {
    pub fn new(
        http: reqwest::Client,
        api_base: &str,
        channel_id: impl Into<String>,
        token: &str,
    ) -> Self {
        let channel_id = channel_id.into();
        Self {
            http,
            url: build_messages_url(api_base, &channel_id),
            authorization: format!("Bot {token}"),
            channel_id,
        }
    }

    /// Builds the client and its connection pool from process configuration.
    pub fn from_config(cfg: &RelayConfig) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| RelayError::Request(Box::new(err)))?;
        Ok(Self::new(http, &cfg.api_base, cfg.channel_id.clone(), &cfg.token))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatSink for DiscordClient {
    async fn deliver(&self, payload: Vec<u8>) -> Result<DeliveryReceipt, RelayError> {
        let request = self
            .http
            .post(&self.url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .build()
            .map_err(|err| RelayError::Request(Box::new(err)))?;

        let started = Instant::now();
        let response = self
            .http
            .execute(request)
            .await
            .map_err(RelayError::Transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(RelayError::Transport)?;

        let labels = TelemetryLabels {
            channel_id: Some(self.channel_id.clone()),
            ..TelemetryLabels::new("discord")
        }
        .with_extra("status", status.to_string());
        record_histogram(REQUEST_SECONDS, started.elapsed().as_secs_f64(), &labels);

        Ok(DeliveryReceipt { status, body })
    }
}

pub fn build_messages_url(api_base: &str, channel_id: &str) -> String {
    format!(
        "{}/{}/channels/{}/messages",
        api_base.trim_end_matches('/'),
        API_VERSION_PATH,
        channel_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Bytes,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Captured {
        channel: String,
        authorization: Option<String>,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    type Calls = Arc<Mutex<Vec<Captured>>>;

    async fn capture(
        State(calls): State<Calls>,
        Path(channel): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, &'static str) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        calls.lock().unwrap().push(Captured {
            channel,
            authorization: header("authorization"),
            content_type: header("content-type"),
            body: body.to_vec(),
        });
        (StatusCode::OK, r#"{"id":"1"}"#)
    }

    async fn spawn_mock() -> (String, Calls) {
        let calls: Calls = Arc::default();
        let app = Router::new()
            .route("/api/v8/channels/{channel}/messages", post(capture))
            .with_state(calls.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), calls)
    }

    #[test]
    fn build_messages_url_trims_slash() {
        assert_eq!(
            build_messages_url("https://discord.com/", "42"),
            "https://discord.com/api/v8/channels/42/messages"
        );
        assert_eq!(
            build_messages_url("http://127.0.0.1:9000", "chan"),
            "http://127.0.0.1:9000/api/v8/channels/chan/messages"
        );
    }

    #[test]
    fn receipt_success_range() {
        let ok = DeliveryReceipt {
            status: 204,
            body: String::new(),
        };
        let err = DeliveryReceipt {
            status: 401,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }

    #[tokio::test]
    async fn posts_with_bot_authorization() {
        let (base, calls) = spawn_mock().await;
        let client = DiscordClient::new(reqwest::Client::new(), &base, "998877", "sekret");

        let receipt = client
            .deliver(br#"{"content":"hi"}"#.to_vec())
            .await
            .expect("deliver");
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.body, r#"{"id":"1"}"#);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].channel, "998877");
        assert_eq!(calls[0].authorization.as_deref(), Some("Bot sekret"));
        assert_eq!(calls[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(calls[0].body, br#"{"content":"hi"}"#.to_vec());
    }

    #[tokio::test]
    async fn invalid_token_fails_request_construction() {
        let client = DiscordClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "1",
            "bad\ntoken",
        );
        let err = client.deliver(b"{}".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), "request");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{addr}");
        let client = DiscordClient::new(reqwest::Client::new(), &base, "1", "t");
        let err = client.deliver(b"{}".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
