//! WebSocket Push Feed
//!
//! Lets an out-of-process host push envelopes over a WebSocket. Every text
//! frame is parsed as an [`InboundMessage`] and dispatched through the
//! [`PushChannel`], so subscriptions cannot tell it apart from in-process
//! delivery.

use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::error::{BridgeError, Result};
use crate::host::PushChannel;
use crate::runtime;

/// Ready state of a push feed (mirrors the browser WebSocket states).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FeedState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl FeedState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => FeedState::Connecting,
            1 => FeedState::Open,
            2 => FeedState::Closing,
            _ => FeedState::Closed,
        }
    }
}

/// A live WebSocket connection feeding a [`PushChannel`].
///
/// Dropping the feed closes it.
pub struct PushFeed {
    url: url::Url,
    state: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl PushFeed {
    /// Connect to `url` and start forwarding envelopes to `channel`.
    ///
    /// Returns once the connection task is spawned; connection failures are
    /// logged and leave the feed in [`FeedState::Closed`].
    pub fn connect(url: &str, channel: Arc<PushChannel>) -> Result<Self> {
        let url = url::Url::parse(url)?;
        let request = url
            .as_str()
            .into_client_request()
            .map_err(|e| BridgeError::Feed(e.to_string()))?;

        let state = Arc::new(AtomicU8::new(FeedState::Connecting as u8));
        let task_state = state.clone();
        let target = url.to_string();

        let task = runtime::spawn(async move {
            log::info!("[PushFeed] Connecting to {}", target);

            let mut ws_stream = match tokio_tungstenite::connect_async(request).await {
                Ok((stream, response)) => {
                    log::info!("[PushFeed] Connected (status: {})", response.status());
                    stream
                }
                Err(e) => {
                    log::error!("[PushFeed] Handshake with {} failed: {}", target, e);
                    task_state.store(FeedState::Closed as u8, Ordering::SeqCst);
                    return;
                }
            };

            task_state.store(FeedState::Open as u8, Ordering::SeqCst);

            while let Some(msg_result) = ws_stream.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => {
                        log::debug!(
                            "[PushFeed] Received: {}",
                            text.chars().take(100).collect::<String>()
                        );
                        if let Err(e) = channel.dispatch_json(&text) {
                            log::warn!("[PushFeed] Dropping frame: {}", e);
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        log::debug!("[PushFeed] Ignoring binary frame ({} bytes)", data.len());
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                    Ok(Message::Close(frame)) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((1000, String::new()));
                        log::info!("[PushFeed] Host closed feed: {} {}", code, reason);
                        break;
                    }
                    Err(e) => {
                        log::error!("[PushFeed] Read error: {}", e);
                        break;
                    }
                }
            }

            task_state.store(FeedState::Closed as u8, Ordering::SeqCst);
            log::info!("[PushFeed] Feed ended");
        });

        Ok(Self { url, state, task })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    pub fn state(&self) -> FeedState {
        FeedState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Stop reading from the host. Envelopes already dispatched are unaffected.
    pub fn close(&self) {
        if self.state() == FeedState::Closed {
            return;
        }
        self.state.store(FeedState::Closing as u8, Ordering::SeqCst);
        self.task.abort();
        self.state.store(FeedState::Closed as u8, Ordering::SeqCst);
        log::info!("[PushFeed] Closed {}", self.url);
    }
}

impl Drop for PushFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
