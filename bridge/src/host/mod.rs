//! Host Plumbing
//!
//! Environment detection and inbound message delivery.
//! No UI semantics live here - this can be used standalone.

mod channel;
mod environment;
mod feed;

pub use channel::{InboundMessage, ListenerId, PushChannel};
pub use environment::{Environment, HostGlobals, NativeInvoker};
pub use feed::{FeedState, PushFeed};
