//! Atom documents pushed by the YouTube WebSub hub.
//!
//! ```text
//! <feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
//!   <link rel="hub" href="https://pubsubhubbub.appspot.com"/>
//!   <title>YouTube video feed</title>
//!   <updated>2015-04-01T19:05:24.552394234+00:00</updated>
//!   <entry>
//!     <id>yt:video:VIDEO_ID</id>
//!     <yt:videoId>VIDEO_ID</yt:videoId>
//!     <yt:channelId>CHANNEL_ID</yt:channelId>
//!     <title>Video title</title>
//!     <link rel="alternate" href="http://www.youtube.com/watch?v=VIDEO_ID"/>
//!     <author>
//!       <name>Channel title</name>
//!       <uri>http://www.youtube.com/channel/CHANNEL_ID</uri>
//!     </author>
//!     <published>2015-03-06T21:40:57+00:00</published>
//!     <updated>2015-03-09T19:05:24.552394234+00:00</updated>
//!   </entry>
//! </feed>
//! ```

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("notification body is not valid utf-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("malformed feed document: {0}")]
    Xml(#[from] quick_xml::de::DeError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "entry", default)]
    pub entries: Vec<FeedEntry>,
    /// Tombstones sent when a video is removed or made private.
    #[serde(rename = "deleted-entry", alias = "at:deleted-entry", default)]
    pub deleted_entries: Vec<DeletedEntry>,
}

impl FeedDocument {
    /// The entry a notification is about. The hub sends one entry per
    /// notification; anything after the first is ignored.
    pub fn entry(&self) -> Option<&FeedEntry> {
        self.entries.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedEntry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "videoId", alias = "yt:videoId", default)]
    pub video_id: String,
    #[serde(rename = "channelId", alias = "yt:channelId", default)]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "link", default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub updated: String,
}

impl FeedEntry {
    /// The watch page of the video: the `alternate` link, or the first link
    /// when none is marked as such.
    pub fn link(&self) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.rel == "alternate")
            .or_else(|| self.links.first())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    #[serde(rename = "@rel", default)]
    pub rel: String,
    #[serde(rename = "@href", default)]
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeletedEntry {
    #[serde(rename = "@ref", default)]
    pub reference: String,
    #[serde(rename = "@when", default)]
    pub when: String,
}

pub fn decode_feed(body: &[u8]) -> Result<FeedDocument, FeedError> {
    let text = std::str::from_utf8(body)?;
    Ok(quick_xml::de::from_str(text)?)
}
