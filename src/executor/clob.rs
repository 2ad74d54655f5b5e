//! Live order submission
//!
//! Bridges the pipeline to the CLOB client. Order sizing and pricing live
//! behind this seam, alongside wallet signing.

use super::{CopyOrder, OrderSubmitter};
use async_trait::async_trait;

/// Submits copy orders through the CLOB client
pub struct ClobSubmitter {
    retry_limit: u32,
}

impl ClobSubmitter {
    pub fn new(retry_limit: u32) -> Self {
        Self { retry_limit }
    }
}

#[async_trait]
impl OrderSubmitter for ClobSubmitter {
    async fn submit(&self, order: &CopyOrder) -> anyhow::Result<()> {
        // TODO: Wire the CLOB client order signing and submission flow
        tracing::info!(
            side = order.side.as_order_word(),
            condition_id = %order.activity.activity.condition_id,
            usdc_size = %order.activity.activity.usdc_size,
            price = %order.activity.activity.price,
            leader = %order.leader_address,
            own_balance = %order.own_balance,
            leader_balance = %order.leader_balance,
            retry_limit = self.retry_limit,
            "Submitting copy order"
        );
        Ok(())
    }
}
