//! HTTP client for the order API.
//!
//! Orders and cancellations are submitted as JSON; the API is mockable
//! behind the [`OrderbookApi`] trait so pipelines can be tested with scripted
//! substitutes.

use anyhow::{Context as _, Result};
use model::order::{OrderCancellation, OrderCreation, OrderUid};
use reqwest::{Client, IntoUrl, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Returns the default API endpoint for a chain, or `None` if no deployment
/// serves that chain.
pub fn default_api_url(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("https://api.cow.fi/mainnet"),
        5 => Some("https://api.cow.fi/goerli"),
        100 => Some("https://api.cow.fi/xdai"),
        42161 => Some("https://api.cow.fi/arbitrum_one"),
        11155111 => Some("https://api.cow.fi/sepolia"),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum OrderApiError {
    /// The API answered with a non-success status. Nothing was persisted.
    #[error("order API rejected the request with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("failed to decode order API response {1:?}: {0}")]
    Deserialize(serde_json::Error, String),

    // Received a response but failed reading its body.
    #[error("failed to read order API response")]
    TextFetch(#[source] reqwest::Error),

    // Connectivity or non-response error.
    #[error("failed to send request to the order API")]
    Send(#[source] reqwest::Error),
}

/// Error body the API attaches to rejections.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    error_type: String,
    description: String,
}

/// Abstract order API. Provides a mockable implementation.
#[mockall::automock]
#[async_trait::async_trait]
pub trait OrderbookApi: Send + Sync {
    /// Submits an order for creation and returns the identifier the API
    /// assigned to it.
    async fn create_order(&self, order: &OrderCreation) -> Result<OrderUid, OrderApiError>;

    /// Submits a signed order cancellation.
    async fn cancel_order(&self, cancellation: &OrderCancellation) -> Result<(), OrderApiError>;
}

/// Order API client implementation.
#[derive(Debug)]
pub struct DefaultOrderbookApi {
    client: Client,
    base_url: Url,
}

impl DefaultOrderbookApi {
    /// Creates a new client for the given endpoint.
    pub fn new(base_url: impl IntoUrl, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url.into_url().context("order api url")?,
        })
    }

    /// Creates a new client for the default endpoint serving the given chain.
    pub fn for_chain(chain_id: u64, client: Client) -> Option<Self> {
        // Unwrap because the hard coded endpoints are valid URLs.
        Some(Self::new(default_api_url(chain_id)?, client).unwrap())
    }

    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            // Unwrap because the constructor only accepts URLs that can be a
            // base.
            .unwrap()
            .pop_if_empty()
            .extend(path);
        url
    }

    async fn post<B, T>(&self, url: Url, body: &B) -> Result<T, OrderApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response_text = self.post_for_text(url, body).await?;
        serde_json::from_str(&response_text)
            .map_err(|err| OrderApiError::Deserialize(err, response_text))
    }

    async fn post_for_text<B>(&self, url: Url, body: &B) -> Result<String, OrderApiError>
    where
        B: Serialize + Sync,
    {
        tracing::debug!(%url, "posting to order API");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(OrderApiError::Send)?;
        let status = response.status();
        let response_text = response.text().await.map_err(OrderApiError::TextFetch)?;
        tracing::debug!(%status, response = %response_text, "order API response");

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorBody>(&response_text) {
                Ok(body) => format!("{}: {}", body.error_type, body.description),
                Err(_) => response_text,
            };
            return Err(OrderApiError::Rejected { status, message });
        }
        Ok(response_text)
    }
}

#[async_trait::async_trait]
impl OrderbookApi for DefaultOrderbookApi {
    async fn create_order(&self, order: &OrderCreation) -> Result<OrderUid, OrderApiError> {
        self.post(self.url(&["api", "v1", "orders"]), order).await
    }

    async fn cancel_order(&self, cancellation: &OrderCancellation) -> Result<(), OrderApiError> {
        self.post_for_text(self.url(&["api", "v1", "orders", "cancellation"]), cancellation)
            .await?;
        Ok(())
    }
}
