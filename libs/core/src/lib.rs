//! Core of the websub relay.
//!
//! Decodes the Atom documents a WebSub hub pushes for a YouTube channel,
//! turns the announced upload into a Discord channel message and delivers it
//! through a [`ChatSink`].
pub mod config;
pub mod discord;
pub mod error;
pub mod feed;
pub mod message;
pub mod relay;
pub mod translator;

pub use config::{ConfigError, RelayConfig};
pub use discord::{ChatSink, DeliveryReceipt, DiscordClient, build_messages_url};
pub use error::RelayError;
pub use feed::{Author, DeletedEntry, FeedDocument, FeedEntry, FeedError, Link, decode_feed};
pub use message::{ChatEmbed, ChatImage, ChatMessage};
pub use relay::NotificationRelay;
pub use translator::{NotificationTranslator, Verification};
