//! Leader activity feed module
//!
//! Wire types and the data API client for leader trades, account
//! positions and balances

mod client;
mod types;

pub use client::{DataApiClient, DataApiConfig, DATA_API_URL};
pub use types::{Activity, PositionData, QueueActivity, RawTimestamp, Side};

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for leader activity sources
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch the leader's recent trade activities, newest first
    async fn recent_trades(&self, address: &str) -> anyhow::Result<Vec<Activity>>;
}

/// Trait for account position and balance lookups
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Fetch all open positions for an address
    async fn positions(&self, address: &str) -> anyhow::Result<Vec<PositionData>>;
    /// Fetch the USDC balance of an address
    async fn usdc_balance(&self, address: &str) -> anyhow::Result<Decimal>;
}
