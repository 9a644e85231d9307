//! Inbound WebSub surface.
//!
//! ```text
//! GET  /?hub.challenge=...  subscription verification, echoes the challenge
//! POST /                    Atom content notification, relayed to Discord
//! GET  /healthz             liveness probe
//! ```
//!
//! Any other path dispatches like `/`, so a callback registered as
//! `https://host/youtube` works unchanged.

use std::error::Error as _;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::to_bytes,
    extract::{RawQuery, Request, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use tracing::Instrument;
use wsr_core::{
    ChatSink, DiscordClient, NotificationRelay, NotificationTranslator, RelayConfig, RelayError,
    Verification,
};
use wsr_telemetry::{TelemetryLabels, notification_span, record_counter};

use crate::reqid::{RequestId, with_request_id};

const SOURCE: &str = "youtube";
const RECEIVED_COUNTER: &str = "notifications_received";
const DROPPED_COUNTER: &str = "notifications_dropped";
const VERIFIED_COUNTER: &str = "verifications_answered";

/// Notification bodies larger than this are dropped unread.
pub const MAX_NOTIFICATION_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub relay: NotificationRelay,
}

impl AppState {
    pub fn new(relay: NotificationRelay) -> Self {
        Self { relay }
    }

    /// Wires the translator to the Discord client described by `cfg`.
    pub fn from_config(cfg: &RelayConfig) -> Result<Self> {
        let sink: Arc<dyn ChatSink> = Arc::new(DiscordClient::from_config(cfg)?);
        let translator = NotificationTranslator::from_config(cfg);
        Ok(Self::new(NotificationRelay::new(translator, sink)))
    }
}

pub fn build_router(state: AppState) -> Router {
    let callback = get(handle_verification).post(handle_notification);
    Router::new()
        .route("/", callback.clone())
        .route("/healthz", get(healthz))
        .fallback(callback)
        .layer(middleware::from_fn(with_request_id))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn handle_verification(RawQuery(query): RawQuery) -> String {
    let verification = Verification::from_query(query.as_deref());
    tracing::info!(
        challenge = %verification.challenge,
        mode = verification.mode.as_deref().unwrap_or(""),
        topic = verification.topic.as_deref().unwrap_or(""),
        lease_seconds = verification.lease_seconds.as_deref().unwrap_or(""),
        "answering hub verification"
    );
    record_counter(VERIFIED_COUNTER, 1, &TelemetryLabels::new(SOURCE));
    verification.challenge
}

/// Always answers 200 with an empty body; failures only reach the log so
/// the hub never sees an error for a notification.
async fn handle_notification(State(state): State<AppState>, request: Request) -> StatusCode {
    let request_id = request.extensions().get::<RequestId>().map(|rid| rid.0.clone());
    let span = notification_span(request_id.as_deref());

    async move {
        record_counter(RECEIVED_COUNTER, 1, &TelemetryLabels::new(SOURCE));
        let outcome = match to_bytes(request.into_body(), MAX_NOTIFICATION_BYTES).await {
            Ok(body) => state.relay.handle_notification(&body).await.map(|_| ()),
            Err(err) => Err(RelayError::read_body(err)),
        };
        if let Err(err) = outcome {
            tracing::error!(
                error = %err,
                cause = ?err.source(),
                reason = err.kind(),
                "notification dropped"
            );
            let labels = TelemetryLabels::new(SOURCE).with_extra("reason", err.kind());
            record_counter(DROPPED_COUNTER, 1, &labels);
        }
    }
    .instrument(span)
    .await;

    StatusCode::OK
}
