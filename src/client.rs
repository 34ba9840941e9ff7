use futures_util::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::ResearchError;
use crate::models::{HealthStatus, ResearchRequest, ResearchResult, ServerLimits};

/// The remote research service as the controller sees it: one request in,
/// one result or failure out.
pub trait ResearchService: Send + Sync {
    fn research(
        &self,
        request: ResearchRequest,
    ) -> BoxFuture<'_, Result<ResearchResult, ResearchError>>;
}

pub struct HttpResearchClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpResearchClient {
    pub fn with_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Could not build HTTP client with timeout: {}. Using defaults.", e);
                reqwest::Client::new()
            });

        HttpResearchClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn submit(&self, request: &ResearchRequest) -> Result<ResearchResult, ResearchError> {
        let url = format!("{}/research", self.base_url);
        debug!(%url, max_iterations = request.max_iterations, "posting research request");

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "research service rejected request");
            return Err(ResearchError::transport(status));
        }

        // Read the body first so a shape mismatch is reported as malformed
        // rather than as a transport failure.
        let body = response.text().await?;
        let result: ResearchResult = serde_json::from_str(&body)?;
        Ok(result)
    }

    pub async fn health(&self) -> Result<HealthStatus, ResearchError> {
        self.get_json("health").await
    }

    pub async fn limits(&self) -> Result<ServerLimits, ResearchError> {
        self.get_json("api/config").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ResearchError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ResearchError::transport(response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl ResearchService for HttpResearchClient {
    fn research(
        &self,
        request: ResearchRequest,
    ) -> BoxFuture<'_, Result<ResearchResult, ResearchError>> {
        Box::pin(async move { self.submit(&request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ServiceConfig {
            base_url: "http://localhost:8000/".into(),
            ..ServiceConfig::default()
        };
        let client = HttpResearchClient::with_config(&config);
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
