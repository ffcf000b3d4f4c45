//! Bridge Errors

use std::sync::Arc;

/// Errors surfaced by the bridge.
///
/// Standalone mode without mock data is not an error: requests resolve to
/// `None` and subscriptions simply never fire.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The outbound call to the host endpoint could not complete.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The host responded with a body that is not valid JSON for the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request payload could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound push envelope was malformed.
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    /// The WebSocket push feed failed.
    #[error("push feed error: {0}")]
    Feed(String),

    /// A spawned call was cancelled or panicked before settling.
    #[error("call task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error shared between a wrapper's observable state and its caller.
pub type SharedError = Arc<BridgeError>;
