//! Config update client for a running API server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use super::ServiceError;
use crate::presets::ApiParameters;

/// Sampling parameters that take effect on a running server.
///
/// The API port and the model parameters are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConfigBody {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl From<&ApiParameters> for UpdateConfigBody {
    fn from(params: &ApiParameters) -> Self {
        Self {
            max_tokens: params.max_response_token,
            temperature: params.temperature,
            top_p: params.top_p,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
        }
    }
}

/// Applies sampling parameters to the server listening on `port`.
#[async_trait]
pub trait ConfigUpdater: Send + Sync {
    async fn update_config(&self, port: u16, body: &UpdateConfigBody) -> Result<(), ServiceError>;
}

/// `POST http://<host>:<port>/update-config` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpConfigUpdater {
    client: reqwest::Client,
    host: String,
    timeout: Duration,
}

impl HttpConfigUpdater {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            timeout,
        }
    }

    /// Endpoint for the server on `port`.
    pub fn endpoint(&self, port: u16) -> Result<Url, ServiceError> {
        let base = format!("http://{}:{}/", self.host, port);
        Url::parse(&base)
            .and_then(|url| url.join("update-config"))
            .map_err(|e| ServiceError::InvalidEndpoint(format!("{base}: {e}")))
    }
}

#[async_trait]
impl ConfigUpdater for HttpConfigUpdater {
    async fn update_config(&self, port: u16, body: &UpdateConfigBody) -> Result<(), ServiceError> {
        let url = self.endpoint(port)?;
        debug!(%url, ?body, "Pushing config update");

        let response = self
            .client
            .post(url.clone())
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Config update failed: {} - {}", status, text);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        info!(%url, "Config update applied");
        Ok(())
    }
}
