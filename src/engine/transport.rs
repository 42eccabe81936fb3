//! List transport: executes a list request and returns rows plus a total count.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::errors::{AppError, ErrorResponse};
use crate::models::{TransportPage, WireParams};

/// Executes list requests for a named resource.
#[async_trait]
pub trait ListTransport: Send + Sync {
    async fn fetch(&self, resource: &str, params: &WireParams) -> Result<TransportPage, AppError>;
}

/// Fetches table pages from the portal list backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpListTransport {
    client: Client,
    base_url: String,
}

impl HttpListTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// The rows endpoint for `table`, with the name percent-encoded as one path segment.
    fn rows_url(&self, table: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            AppError::Transport(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Transport(format!("Base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "tables", table, "rows"]);
        Ok(url)
    }
}

#[async_trait]
impl ListTransport for HttpListTransport {
    async fn fetch(&self, resource: &str, params: &WireParams) -> Result<TransportPage, AppError> {
        let response = self
            .client
            .get(self.rows_url(resource)?)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the server's own message over the bare status line.
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("Request failed with status {}", status),
            };
            return Err(AppError::Transport(message));
        }

        Ok(response.json::<TransportPage>().await?)
    }
}
