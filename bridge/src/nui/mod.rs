//! UI-Facing Primitives
//!
//! Request/response calls and push-event subscriptions, each with a
//! standalone mock path for developing the UI without the host.

mod fire;
mod handler;
mod mock;
mod state;
mod stateful;
mod subscription;
mod transport;

pub use fire::{FireAndForget, FireInvoker};
pub use handler::HandlerCell;
pub use mock::{DelayConfig, MockConfig};
pub use state::RequestCallState;
pub use stateful::{Invoker, StatefulRequest};
pub use subscription::Subscription;
pub use transport::{JSON_CONTENT_TYPE, Transport};
