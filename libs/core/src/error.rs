use crate::feed::FeedError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way handling a notification can stop early. None of these reach the
/// webhook caller; they are logged and the notification is dropped.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to read notification body")]
    ReadBody(#[source] BoxError),
    #[error("failed to decode feed document")]
    Decode(#[from] FeedError),
    #[error("failed to encode chat message")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build discord request")]
    Request(#[source] BoxError),
    #[error("discord request failed")]
    Transport(#[source] reqwest::Error),
}

impl RelayError {
    pub fn read_body<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RelayError::ReadBody(err.into())
    }

    /// Short label used for the `reason` tag on drop counters.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::ReadBody(_) => "read_body",
            RelayError::Decode(_) => "decode",
            RelayError::Encode(_) => "encode",
            RelayError::Request(_) => "request",
            RelayError::Transport(_) => "transport",
        }
    }
}
