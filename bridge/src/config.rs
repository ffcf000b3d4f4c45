use std::time::Duration;

/// Resource name used when the host does not provide one.
pub const FALLBACK_RESOURCE_NAME: &str = "nui-frame-app";

/// Mock delay applied when a call does not set its own.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(500);

/// Bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub scheme: String,
    pub fallback_resource_name: String,
    pub default_mock_delay: Duration,
    pub push_feed_url: Option<String>,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_fallback_resource_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_resource_name = name.into();
        self
    }

    pub fn with_default_mock_delay(mut self, delay: Duration) -> Self {
        self.default_mock_delay = delay;
        self
    }

    /// WebSocket URL the host pushes envelopes on, if it runs out of process.
    pub fn with_push_feed_url(mut self, url: impl Into<String>) -> Self {
        self.push_feed_url = Some(url.into());
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            fallback_resource_name: FALLBACK_RESOURCE_NAME.to_string(),
            default_mock_delay: DEFAULT_MOCK_DELAY,
            push_feed_url: None,
        }
    }
}
