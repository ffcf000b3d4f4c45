//! Bridge Facade
//!
//! Wires environment detection, the push channel and the request transport
//! together and hands out the UI-facing primitives.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::host::{Environment, HostGlobals, PushChannel, PushFeed};
use crate::nui::{
    DelayConfig, FireAndForget, HandlerCell, MockConfig, StatefulRequest, Subscription, Transport,
};

pub struct BridgeBuilder {
    config: BridgeConfig,
    globals: Option<Arc<HostGlobals>>,
    environment: Option<Environment>,
    channel: Option<Arc<PushChannel>>,
}

impl BridgeBuilder {
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            globals: None,
            environment: None,
            channel: None,
        }
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use host globals the host runtime has already populated.
    pub fn with_globals(mut self, globals: Arc<HostGlobals>) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Override host detection. Defaults to checking the globals' native invoker.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_push_channel(mut self, channel: Arc<PushChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Build the bridge, connecting the push feed if one is configured.
    pub fn build(self) -> Result<Bridge> {
        let globals = self.globals.unwrap_or_default();
        let environment = self
            .environment
            .unwrap_or_else(|| Environment::from_globals(globals.clone()));
        let channel = self.channel.unwrap_or_default();

        let feed = match &self.config.push_feed_url {
            Some(url) => Some(Arc::new(PushFeed::connect(url, channel.clone())?)),
            None => None,
        };

        let transport = Arc::new(Transport::new(
            environment.clone(),
            globals.clone(),
            self.config,
        ));

        log::info!("Bridge ready (standalone: {})", environment.is_standalone());

        Ok(Bridge {
            environment,
            globals,
            channel,
            transport,
            feed,
        })
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for UI code talking to the host.
///
/// Cheap to clone; clones share the push channel, transport and feed.
#[derive(Clone)]
pub struct Bridge {
    environment: Environment,
    globals: Arc<HostGlobals>,
    channel: Arc<PushChannel>,
    transport: Arc<Transport>,
    feed: Option<Arc<PushFeed>>,
}

impl Bridge {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    pub fn is_standalone(&self) -> bool {
        self.environment.is_standalone()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn globals(&self) -> &Arc<HostGlobals> {
        &self.globals
    }

    pub fn push_channel(&self) -> &Arc<PushChannel> {
        &self.channel
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    pub fn config(&self) -> &BridgeConfig {
        self.transport.config()
    }

    /// The push feed connected at build time, if any.
    pub fn feed(&self) -> Option<&PushFeed> {
        self.feed.as_deref()
    }

    /// Subscribe `handler` to push messages whose action is `action`.
    ///
    /// In standalone mode, `mock.mock_data` is delivered once after the mock
    /// delay; without mock data nothing is ever delivered.
    pub fn subscribe<T>(
        &self,
        action: impl Into<String>,
        handler: impl Fn(T) + Send + Sync + 'static,
        mock: MockConfig<T>,
    ) -> Subscription<T>
    where
        T: DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
    {
        Subscription::new(
            self.environment.clone(),
            self.channel.clone(),
            self.config().default_mock_delay,
            action.into(),
            HandlerCell::new(handler),
            mock,
        )
    }

    /// Issue one request to the host and decode its response.
    pub async fn request<T, D>(
        &self,
        event_name: &str,
        data: Option<&D>,
        mock: &MockConfig<T>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Clone,
        D: Serialize,
    {
        self.transport.request(event_name, data, mock).await
    }

    /// Request call site with `{ loading, error }` state and a success callback.
    pub fn stateful_request<T, D>(
        &self,
        event_name: impl Into<String>,
        callback: impl Fn(Option<T>) + Send + Sync + 'static,
        mock: MockConfig<T>,
    ) -> StatefulRequest<T, D>
    where
        T: DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
        D: Serialize + Send + Sync + 'static,
    {
        StatefulRequest::new(
            self.transport.clone(),
            event_name.into(),
            HandlerCell::new(callback),
            mock,
        )
    }

    /// Completion-only call site with `{ loading, error }` state.
    pub fn fire_and_forget<D>(
        &self,
        event_name: impl Into<String>,
        options: DelayConfig,
    ) -> FireAndForget<D>
    where
        D: Serialize + Send + Sync + 'static,
    {
        FireAndForget::new(self.transport.clone(), event_name.into(), options)
    }

    /// Connect an additional WebSocket push feed into this bridge's channel.
    pub fn connect_feed(&self, url: &str) -> Result<PushFeed> {
        PushFeed::connect(url, self.channel.clone())
    }
}
