use crate::api::traits::ListingApi;
use crate::api::types::{ErrorBody, ListingQuery};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Listing, SubmissionPayload};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path of the listing collection on the endpoint
pub const LISTINGS_PATH: &str = "/api/properties";

/// Listing endpoint client over HTTP
pub struct HttpListingApi {
    client: Client,
    base_url: String,
}

impl HttpListingApi {
    /// Create a client for the endpoint described by `config`
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client with default settings against `base_url`
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, LISTINGS_PATH)
    }

    /// Turn a non-success response into a rejection, keeping the server's
    /// `message` when the body carries one
    async fn rejection(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!("Rejected with {}: {}", status, body);
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message);
        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ListingApi for HttpListingApi {
    async fn create(&self, payload: &SubmissionPayload) -> Result<Listing, ApiError> {
        let url = self.collection_url();
        info!("Creating listing '{}' at {}", payload.listing.slug, url);

        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            warn!("Listing endpoint returned status: {}", response.status());
            return Err(Self::rejection(response).await);
        }

        let listing = response
            .json::<Listing>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        info!("✅ Listing '{}' created", listing.slug);
        Ok(listing)
    }

    async fn list(&self, query: &ListingQuery) -> Result<Vec<Listing>, ApiError> {
        let url = self.collection_url();
        debug!("Fetching listings from {} ({:?})", url, query);

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            warn!("Listing endpoint returned status: {}", response.status());
            return Err(Self::rejection(response).await);
        }

        let listings = response
            .json::<Vec<Listing>>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        debug!("Fetched {} listings", listings.len());
        Ok(listings)
    }

    fn endpoint_name(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url_trims_trailing_slash() {
        let api = HttpListingApi::with_base_url("http://localhost:3000/").unwrap();
        assert_eq!(api.collection_url(), "http://localhost:3000/api/properties");
        assert_eq!(api.endpoint_name(), "http://localhost:3000");
    }
}
