//! Maps WebSub requests onto responses and Discord messages.

use url::form_urlencoded;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::feed::FeedDocument;
use crate::message::{ChatEmbed, ChatImage, ChatMessage};

const CHALLENGE_KEY: &str = "hub.challenge";

/// Parameters of a hub subscription-verification request. Only the challenge
/// affects the response; the rest is kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub mode: Option<String>,
    pub topic: Option<String>,
    pub lease_seconds: Option<String>,
    pub challenge: String,
}

impl Verification {
    /// Parses a raw query string. Repeated `hub.challenge` values are
    /// concatenated in order with no separator; a missing one yields "".
    pub fn from_query(query: Option<&str>) -> Self {
        let mut verification = Verification::default();
        let Some(query) = query else {
            return verification;
        };
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                CHALLENGE_KEY => verification.challenge.push_str(&value),
                "hub.mode" => verification.mode = Some(value.into_owned()),
                "hub.topic" => verification.topic = Some(value.into_owned()),
                "hub.lease_seconds" => verification.lease_seconds = Some(value.into_owned()),
                _ => {}
            }
        }
        verification
    }
}

#[derive(Debug, Clone)]
pub struct NotificationTranslator {
    image_url: String,
}

impl NotificationTranslator {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
        }
    }

    pub fn from_config(cfg: &RelayConfig) -> Self {
        Self::new(cfg.image_url.clone())
    }

    /// Builds the channel message for the first entry of `feed`. A feed with
    /// no entries still produces a message, with empty fields.
    pub fn to_message(&self, feed: &FeedDocument) -> ChatMessage {
        let entry = feed.entry().cloned().unwrap_or_default();
        ChatMessage {
            content: format!("{} Just Posted a Video!", entry.author.name),
            embed: ChatEmbed {
                url: entry.link().map(|l| l.href.clone()).unwrap_or_default(),
                title: entry.title,
                image: ChatImage {
                    url: self.image_url.clone(),
                },
            },
        }
    }

    pub fn encode(&self, message: &ChatMessage) -> Result<Vec<u8>, RelayError> {
        serde_json::to_vec(message).map_err(RelayError::Encode)
    }
}
