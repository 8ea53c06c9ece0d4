pub mod talk_service;

use std::fmt::Display;

pub use talk_service::TalkService;

use crate::model::BlendshapeBatch;

/// A source of blend shape data for a line of text.
///
/// The returned batch has fully arrived in memory. Retrying on failure is left to the caller.
pub trait Receiver {
    fn submit_text(&self, text: &str) -> Result<BlendshapeBatch, ReceiverError>;
}

#[derive(Debug)]
pub enum ReceiverError {
    /// The HTTP client could not be created.
    Client(reqwest::Error),
    Request { url: String, error: reqwest::Error },
    Status { url: String, status: u16 },
    Decode(serde_json::Error),
}

impl Display for ReceiverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(e) => write!(f, "Unable to create http client: {e}"),
            Self::Request { url, error } => write!(f, "Request to {url} failed: {error}"),
            Self::Status { url, status } => write!(f, "{url} responded with status {status}"),
            Self::Decode(e) => write!(f, "Unable to decode blend shape data: {e}"),
        }
    }
}

impl std::error::Error for ReceiverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
            Self::Request { error, .. } => Some(error),
            Self::Status { .. } => None,
            Self::Decode(e) => Some(e),
        }
    }
}
