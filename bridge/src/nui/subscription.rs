//! Event Subscriptions
//!
//! A [`Subscription`] binds an action name to a handler. With the host
//! present it holds exactly one listener on the [`PushChannel`]; in
//! standalone mode it holds at most one mock timer. Swapping the handler
//! never touches either.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::host::{Environment, ListenerId, PushChannel};
use crate::nui::{HandlerCell, MockConfig};
use crate::runtime;

/// What a subscription currently holds open. Dropping it tears it down.
enum Registration {
    Listener {
        channel: Arc<PushChannel>,
        id: ListenerId,
    },
    Timer(JoinHandle<()>),
    Inert,
}

impl Drop for Registration {
    fn drop(&mut self) {
        match self {
            Registration::Listener { channel, id } => {
                channel.remove_listener(*id);
            }
            Registration::Timer(handle) => handle.abort(),
            Registration::Inert => {}
        }
    }
}

/// Live subscription to one action. Dropping it unsubscribes.
pub struct Subscription<T> {
    env: Environment,
    channel: Arc<PushChannel>,
    default_delay: Duration,
    handler: HandlerCell<T>,
    action: String,
    mock: MockConfig<T>,
    registration: Registration,
}

impl<T> Subscription<T>
where
    T: DeserializeOwned + Clone + PartialEq + Send + 'static,
{
    pub(crate) fn new(
        env: Environment,
        channel: Arc<PushChannel>,
        default_delay: Duration,
        action: String,
        handler: HandlerCell<T>,
        mock: MockConfig<T>,
    ) -> Self {
        let mut subscription = Self {
            env,
            channel,
            default_delay,
            handler,
            action,
            mock,
            registration: Registration::Inert,
        };
        subscription.registration = subscription.register();
        subscription
    }

    fn register(&self) -> Registration {
        if self.env.is_standalone() {
            let Some(data) = self.mock.mock_data.clone() else {
                log::debug!("'{}' has no mock data, nothing will be delivered", self.action);
                return Registration::Inert;
            };

            let delay = self.mock.delay_or(self.default_delay);
            let handler = self.handler.clone();
            let action = self.action.clone();
            let handle = runtime::spawn(async move {
                tokio::time::sleep(delay).await;
                log::debug!("Delivering mock data for '{}'", action);
                handler.call(data);
            });
            return Registration::Timer(handle);
        }

        let action = self.action.clone();
        let handler = self.handler.clone();
        let id = self.channel.add_listener(move |message| {
            if message.action != action {
                return;
            }
            match serde_json::from_value::<T>(message.data.clone()) {
                Ok(data) => handler.call(data),
                Err(e) => log::warn!("Dropping '{}' message with unexpected data: {}", action, e),
            }
        });

        Registration::Listener {
            channel: self.channel.clone(),
            id,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Replace the handler used for the next delivery. The listener or timer is kept.
    pub fn set_handler(&self, handler: impl Fn(T) + Send + Sync + 'static) {
        self.handler.set(handler);
    }

    /// Re-subscribe if `action` or `mock` differ from the current ones.
    ///
    /// Returns whether the old listener or timer was torn down and recreated.
    pub fn update(&mut self, action: impl Into<String>, mock: MockConfig<T>) -> bool {
        let action = action.into();
        if action == self.action && mock == self.mock {
            return false;
        }

        log::debug!("Re-subscribing '{}' -> '{}'", self.action, action);
        self.registration = Registration::Inert;
        self.action = action;
        self.mock = mock;
        self.registration = self.register();
        true
    }

    /// Whether a listener is registered or a mock delivery is still pending.
    pub fn is_active(&self) -> bool {
        match &self.registration {
            Registration::Listener { .. } => true,
            Registration::Timer(handle) => !handle.is_finished(),
            Registration::Inert => false,
        }
    }
}
