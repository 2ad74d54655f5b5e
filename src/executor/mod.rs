//! Trade execution module
//!
//! Per-worker dequeue loop, sub-minimum aggregation and the order
//! submission path (paper and live)

mod aggregation;
mod clob;
mod paper;
mod worker;

pub use aggregation::{
    AggregatedTrade, AggregationBuffer, AggregationKey, AGG_CHECK_INTERVAL, MIN_TOTAL_USD,
};
pub use clob::ClobSubmitter;
pub use paper::{PaperPosition, PaperTrader, TradeRefusal};
pub use worker::{ExecutorConfig, ExecutorWorker, IDLE_NAP};

use crate::feed::{PositionData, QueueActivity, Side};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Everything the submission seam needs to size and place one order
#[derive(Debug, Clone)]
pub struct CopyOrder {
    pub side: Side,
    /// Operator's position in the traded market, if any
    pub own_position: Option<PositionData>,
    /// Leader's position in the traded market, if any
    pub leader_position: Option<PositionData>,
    pub activity: QueueActivity,
    /// Operator's USDC balance
    pub own_balance: Decimal,
    /// Leader portfolio value (Σ currentValue over their positions)
    pub leader_balance: Decimal,
    pub leader_address: String,
}

/// Trait for order submission implementations
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit one mirrored order
    async fn submit(&self, order: &CopyOrder) -> anyhow::Result<()>;
}
