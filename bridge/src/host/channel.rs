//! Inbound Push Channel
//!
//! The host pushes `{ action, data }` envelopes through a single generic
//! channel. Listeners see every envelope and filter on `action` themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{BridgeError, Result};

/// Envelope delivered by the host's push channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    pub fn new(action: impl Into<String>, data: Value) -> Self {
        Self {
            action: action.into(),
            data,
        }
    }
}

/// Identifies a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    alive: AtomicBool,
    call: Box<dyn Fn(&InboundMessage) + Send + Sync>,
}

/// The host's generic message-passing channel.
#[derive(Default)]
pub struct PushChannel {
    listeners: Mutex<HashMap<ListenerId, Arc<Listener>>>,
    next_id: AtomicU64,
    registrations: AtomicU64,
}

impl PushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &self,
        listener: impl Fn(&InboundMessage) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(
                id,
                Arc::new(Listener {
                    alive: AtomicBool::new(true),
                    call: Box::new(listener),
                }),
            );
        }
        self.registrations.fetch_add(1, Ordering::SeqCst);
        log::debug!("[PushChannel] Added listener {:?}", id);
        id
    }

    /// Unregister a listener. Once this returns, dispatches skip it, including
    /// one already in progress; a call already under way may still finish.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self
            .listeners
            .lock()
            .ok()
            .and_then(|mut listeners| listeners.remove(&id));
        let removed = match removed {
            Some(listener) => {
                listener.alive.store(false, Ordering::SeqCst);
                true
            }
            None => false,
        };
        if removed {
            log::debug!("[PushChannel] Removed listener {:?}", id);
        }
        removed
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Total number of listener registrations over the channel's lifetime.
    pub fn registrations(&self) -> u64 {
        self.registrations.load(Ordering::SeqCst)
    }

    /// Deliver an envelope to every current listener.
    ///
    /// Listeners are snapshotted first so they may add or remove listeners
    /// while being called; a listener removed mid-dispatch is skipped. A call
    /// that has already started still runs to completion. A message sent with
    /// no listener registered is lost.
    pub fn dispatch(&self, message: &InboundMessage) {
        let snapshot: Vec<Arc<Listener>> = match self.listeners.lock() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(e) => {
                log::error!("[PushChannel] Listener table poisoned: {}", e);
                return;
            }
        };

        log::debug!(
            "[PushChannel] Dispatching '{}' to {} listener(s)",
            message.action,
            snapshot.len()
        );

        for listener in snapshot {
            if listener.alive.load(Ordering::SeqCst) {
                (listener.call)(message);
            }
        }
    }

    /// Parse a raw JSON envelope and dispatch it.
    pub fn dispatch_json(&self, raw: &str) -> Result<()> {
        let message: InboundMessage = serde_json::from_str(raw).map_err(BridgeError::Envelope)?;
        self.dispatch(&message);
        Ok(())
    }
}
