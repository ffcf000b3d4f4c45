//! # Overlay Bridge
//!
//! Message bridge between a web UI embedded in a game client's overlay and
//! the host that renders it. The host pushes `{ action, data }` envelopes and
//! answers JSON `POST`s on a local endpoint; this crate turns both into
//! subscriptions and request/response calls, with a standalone mode that
//! serves mock data when the host is absent.
//!
//! ## Example
//!
//! ```no_run
//! use overlay_bridge::{Bridge, DelayConfig, MockConfig};
//! use std::time::Duration;
//!
//! # async fn run() -> overlay_bridge::Result<()> {
//! let bridge = Bridge::builder().build()?;
//!
//! let _visible = bridge.subscribe(
//!     "setVisible",
//!     |visible: bool| println!("visible: {visible}"),
//!     MockConfig::new().with_data(true).with_delay(Duration::from_millis(1000)),
//! );
//!
//! let player: Option<serde_json::Value> = bridge
//!     .request("getPlayerData", None::<&()>, &MockConfig::new())
//!     .await?;
//! println!("{player:?}");
//!
//! let close = bridge.fire_and_forget::<()>("closeUI", DelayConfig::new());
//! let _ = close.invoke(None).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod nui;

mod bridge;
mod runtime;

pub use bridge::{Bridge, BridgeBuilder};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result, SharedError};
pub use host::{
    Environment, FeedState, HostGlobals, InboundMessage, NativeInvoker, PushChannel, PushFeed,
};
pub use nui::{
    DelayConfig, FireAndForget, FireInvoker, Invoker, MockConfig, RequestCallState,
    StatefulRequest, Subscription,
};
