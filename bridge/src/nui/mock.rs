use std::time::Duration;

/// Per-call override used only in standalone mode.
#[derive(Clone, Debug, PartialEq)]
pub struct MockConfig<T> {
    pub mock_data: Option<T>,
    pub mock_delay: Option<Duration>,
}

impl<T> Default for MockConfig<T> {
    fn default() -> Self {
        Self {
            mock_data: None,
            mock_delay: None,
        }
    }
}

impl<T> MockConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.mock_data = Some(data);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = Some(delay);
        self
    }

    pub(crate) fn delay_or(&self, default: Duration) -> Duration {
        self.mock_delay.unwrap_or(default)
    }
}

/// Options for calls that only care about completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelayConfig {
    pub mock_delay: Option<Duration>,
}

impl DelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = Some(delay);
        self
    }

    pub(crate) fn delay_or(&self, default: Duration) -> Duration {
        self.mock_delay.unwrap_or(default)
    }
}
