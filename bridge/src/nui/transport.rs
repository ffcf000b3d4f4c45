//! Request Transport
//!
//! One outbound call per request: `POST <scheme>://<resource>/<event>` with a
//! JSON body. No retries and no timeout beyond what reqwest imposes.

use once_cell::sync::OnceCell;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::host::{Environment, HostGlobals};
use crate::nui::{DelayConfig, MockConfig};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

pub struct Transport {
    env: Environment,
    globals: Arc<HostGlobals>,
    http: reqwest::Client,
    config: BridgeConfig,
    resource_name: OnceCell<String>,
}

impl Transport {
    pub fn new(env: Environment, globals: Arc<HostGlobals>, config: BridgeConfig) -> Self {
        Self {
            env,
            globals,
            http: reqwest::Client::new(),
            config,
            resource_name: OnceCell::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Resource name the host addresses this UI by. Resolved once, then fixed.
    pub fn resource_name(&self) -> &str {
        self.resource_name.get_or_init(|| {
            let name = self
                .globals
                .resource_name()
                .unwrap_or_else(|| self.config.fallback_resource_name.clone());
            log::info!("Resolved resource name: {}", name);
            name
        })
    }

    pub fn endpoint(&self, event_name: &str) -> Result<url::Url> {
        let url = url::Url::parse(&format!(
            "{}://{}/{}",
            self.config.scheme,
            self.resource_name(),
            event_name
        ))?;
        Ok(url)
    }

    /// Encode `data` as the request body, `{}` when absent.
    pub fn encode_body<D: Serialize>(data: Option<&D>) -> Result<Vec<u8>> {
        match data {
            Some(data) => serde_json::to_vec(data).map_err(BridgeError::Encode),
            None => Ok(b"{}".to_vec()),
        }
    }

    async fn post<D: Serialize>(
        &self,
        event_name: &str,
        data: Option<&D>,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(event_name)?;
        let body = Self::encode_body(data)?;

        log::debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {}", url, e);
                BridgeError::Transport(e)
            })?;

        if !response.status().is_success() {
            log::warn!("{} responded with status {}", url, response.status());
        }

        Ok(response)
    }

    /// Issue a request and decode the response.
    ///
    /// In standalone mode without mock data this resolves immediately to `None`.
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
        if self.env.is_standalone() {
            let Some(mock_data) = mock.mock_data.clone() else {
                return Ok(None);
            };
            tokio::time::sleep(mock.delay_or(self.config.default_mock_delay)).await;
            log::debug!("Resolved '{}' with mock data", event_name);
            return Ok(Some(mock_data));
        }

        let response = self.post(event_name, data).await?;
        let bytes = response.bytes().await?;
        let decoded = serde_json::from_slice(&bytes).map_err(|e| {
            log::error!("Response to '{}' is not valid JSON: {}", event_name, e);
            BridgeError::Decode(e)
        })?;
        Ok(Some(decoded))
    }

    /// Issue a request and ignore the response body.
    pub async fn send<D: Serialize>(
        &self,
        event_name: &str,
        data: Option<&D>,
        options: &DelayConfig,
    ) -> Result<()> {
        if self.env.is_standalone() {
            tokio::time::sleep(options.delay_or(self.config.default_mock_delay)).await;
            return Ok(());
        }

        self.post(event_name, data).await?;
        Ok(())
    }
}
