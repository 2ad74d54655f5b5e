//! Polymarket data API client
//!
//! Thin HTTP client for the public data API: leader activity, account
//! positions and USDC balance. Every request carries an explicit timeout;
//! there are no internal retries, the next poll cycle reattempts.

use super::{AccountLookup, Activity, ActivitySource, PositionData};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Polymarket data API base URL
pub const DATA_API_URL: &str = "https://data-api.polymarket.com";

/// Timeout for the activity feed fetch
const FEED_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for individual account lookups
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the data API client
#[derive(Debug, Clone)]
pub struct DataApiConfig {
    pub base_url: String,
    pub feed_timeout: Duration,
    pub lookup_timeout: Duration,
}

impl Default for DataApiConfig {
    fn default() -> Self {
        Self {
            base_url: DATA_API_URL.to_string(),
            feed_timeout: FEED_TIMEOUT,
            lookup_timeout: LOOKUP_TIMEOUT,
        }
    }
}

/// HTTP client for the Polymarket data API
pub struct DataApiClient {
    config: DataApiConfig,
    http: reqwest::Client,
}

/// Account value row from the balance endpoint
#[derive(Debug, Deserialize)]
struct AccountValue {
    #[serde(default)]
    value: Decimal,
}

impl DataApiClient {
    /// Create a client against the production data API
    pub fn new() -> Self {
        Self::with_config(DataApiConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: DataApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl Default for DataApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivitySource for DataApiClient {
    async fn recent_trades(&self, address: &str) -> anyhow::Result<Vec<Activity>> {
        let url = format!(
            "{}/activity?user={}&type=TRADE",
            self.config.base_url, address
        );
        tracing::debug!(address = %address, "Fetching leader activity");
        self.get_json(&url, self.config.feed_timeout).await
    }
}

#[async_trait]
impl AccountLookup for DataApiClient {
    async fn positions(&self, address: &str) -> anyhow::Result<Vec<PositionData>> {
        let url = format!("{}/positions?user={}", self.config.base_url, address);
        self.get_json(&url, self.config.lookup_timeout).await
    }

    async fn usdc_balance(&self, address: &str) -> anyhow::Result<Decimal> {
        let url = format!("{}/value?user={}", self.config.base_url, address);
        let rows: Vec<AccountValue> = self.get_json(&url, self.config.lookup_timeout).await?;
        Ok(rows.first().map(|row| row.value).unwrap_or(Decimal::ZERO))
    }
}
