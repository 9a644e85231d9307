//! Discord channel message payloads.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub content: String,
    pub embed: ChatEmbed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatEmbed {
    pub title: String,
    pub url: String,
    pub image: ChatImage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatImage {
    pub url: String,
}
