//! HTTP access to the assistant backend

use crate::config::BackendConfig;
use crate::messages::{QueryRequest, QueryResponse};
use crate::{AssistError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use tracing::debug;

/// Something that can answer a query with response markup
pub trait QueryBackend: Send + Sync {
    /// Send one query and resolve to the backend's `response` field
    fn query<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Backend reached over `POST /query` with a JSON body
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    /// Create a new backend client
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AssistError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.query_url(),
        })
    }

    /// The endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post a query and return the response markup
    pub async fn send(&self, input: &str) -> Result<String> {
        debug!("POST {} ({} chars)", self.url, input.len());

        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest::new(input))
            .send()
            .await
            .map_err(|e| AssistError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AssistError::BackendStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<QueryResponse>()
            .await
            .map_err(|e| AssistError::ParseError(format!("Failed to parse response: {}", e)))?;

        Ok(body.response)
    }
}

impl QueryBackend for HttpBackend {
    fn query<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<String>> {
        self.send(input).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_from_config() {
        let backend = HttpBackend::new(&BackendConfig::default()).unwrap();
        assert_eq!(backend.url(), "http://127.0.0.1:5000/query");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        let config = BackendConfig {
            // Port 9 (discard) is not expected to accept HTTP
            base_url: "http://127.0.0.1:9".to_string(),
            query_path: "/query".to_string(),
        };
        let backend = HttpBackend::new(&config).unwrap();

        let result = backend.query("hello").await;
        assert!(matches!(result, Err(AssistError::RequestError(_))));
    }
}
