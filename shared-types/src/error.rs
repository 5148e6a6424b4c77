use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons the tracking page cannot show its content.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadError {
    #[error("No token found")]
    MissingCredential,
    #[error("Invalid area ID")]
    InvalidIdentifier,
    #[error("Missing {0} parameter")]
    MissingIdentifier(String),
    #[error("Failed to fetch area details: {0}")]
    AreaFetch(String),
    #[error("Failed to fetch driver details: {0}")]
    DriverFetch(String),
    #[error("Tracking service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("empty frame")]
    EmptyFrame,
    #[error("unknown packet type {0:?}")]
    UnknownPacketType(char),
    #[error("binary packets are not supported")]
    BinaryUnsupported,
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid {event} event: {reason}")]
    InvalidEvent { event: String, reason: String },
    #[error("invalid channel url: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::MalformedPayload(err.to_string())
    }
}
