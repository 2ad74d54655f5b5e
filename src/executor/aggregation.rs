//! Sub-minimum trade aggregation
//!
//! The exchange rejects orders below a $1.00 notional, but leaders often
//! fill in dust-sized clips. BUYs under the minimum are parked here per
//! `(leader, market, token, side)` key and coalesced into one order once
//! the window elapses; windows that never reach the minimum are dropped.

use crate::feed::{QueueActivity, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Exchange minimum order notional in USDC
pub const MIN_TOTAL_USD: Decimal = dec!(1.00);

/// Interval between flusher wake-ups
pub const AGG_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Coalescing key: same leader, market, outcome token and side
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub user_address: String,
    pub condition_id: String,
    pub asset: String,
    pub side: Side,
}

impl AggregationKey {
    fn from_activity(queued: &QueueActivity) -> Self {
        Self {
            user_address: queued.user_address.clone(),
            condition_id: queued.activity.condition_id.clone(),
            asset: queued.activity.asset.clone(),
            side: queued.activity.side,
        }
    }
}

/// A window of coalesced sub-minimum trades
#[derive(Debug, Clone)]
pub struct AggregatedTrade {
    /// Contributing activities in arrival order
    pub trades: Vec<QueueActivity>,
    pub total_usdc_size: Decimal,
    /// Notional-weighted mean price over the contributors
    pub average_price: Decimal,
    /// Window anchor; never changes after the first contribution
    pub first_trade_at: Instant,
    pub last_trade_at: Instant,
    /// Running Σ(usdc · price) so the average stays exact
    notional: Decimal,
}

impl AggregatedTrade {
    fn new(now: Instant) -> Self {
        Self {
            trades: Vec::new(),
            total_usdc_size: Decimal::ZERO,
            average_price: Decimal::ZERO,
            first_trade_at: now,
            last_trade_at: now,
            notional: Decimal::ZERO,
        }
    }

    fn absorb(&mut self, queued: QueueActivity, now: Instant) {
        self.total_usdc_size += queued.activity.usdc_size;
        self.notional += queued.activity.usdc_size * queued.activity.price;
        if self.total_usdc_size > Decimal::ZERO {
            self.average_price = self.notional / self.total_usdc_size;
        }
        self.last_trade_at = now;
        self.trades.push(queued);
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Build the synthetic activity submitted as one order: the first
    /// contributor's fields carrying the combined notional, the weighted
    /// price and the summed token size
    pub fn to_activity(&self) -> Option<QueueActivity> {
        let first = self.trades.first()?;
        let mut synthetic = first.clone();
        synthetic.activity.usdc_size = self.total_usdc_size;
        synthetic.activity.price = self.average_price;
        synthetic.activity.size = self.trades.iter().map(|t| t.activity.size).sum();
        Some(synthetic)
    }
}

/// Per-worker buffer of open aggregation windows
pub struct AggregationBuffer {
    window: Duration,
    pending: HashMap<AggregationKey, AggregatedTrade>,
}

impl AggregationBuffer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// Whether an activity belongs in the buffer at all
    pub fn is_candidate(queued: &QueueActivity) -> bool {
        queued.activity.side == Side::Buy && queued.activity.usdc_size < MIN_TOTAL_USD
    }

    pub fn add(&mut self, queued: QueueActivity) {
        self.add_at(queued, Instant::now());
    }

    pub fn add_at(&mut self, queued: QueueActivity, now: Instant) {
        let key = AggregationKey::from_activity(&queued);
        self.pending
            .entry(key)
            .or_insert_with(|| AggregatedTrade::new(now))
            .absorb(queued, now);
    }

    /// Remove and return every window whose age reached the configured
    /// duration. The caller submits or drops each based on its total.
    pub fn drain_ready(&mut self) -> Vec<AggregatedTrade> {
        self.drain_ready_at(Instant::now())
    }

    pub fn drain_ready_at(&mut self, now: Instant) -> Vec<AggregatedTrade> {
        let ready: Vec<AggregationKey> = self
            .pending
            .iter()
            .filter(|(_, trade)| now.saturating_duration_since(trade.first_trade_at) >= self.window)
            .map(|(key, _)| key.clone())
            .collect();

        ready
            .into_iter()
            .filter_map(|key| self.pending.remove(&key))
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
