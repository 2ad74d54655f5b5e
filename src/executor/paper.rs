//! Paper trading simulator
//!
//! In-memory balance and position book standing in for the live order
//! path. Refusals leave the book untouched.

use crate::feed::{QueueActivity, Side};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Why a simulated trade was refused
#[derive(Debug, Error, PartialEq)]
pub enum TradeRefusal {
    /// Not enough USDC to fund the buy
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },
    /// Not enough of the position to sell
    #[error("insufficient position: held {held}, required {required}")]
    InsufficientPosition { held: Decimal, required: Decimal },
}

/// A simulated holding in one market
#[derive(Debug, Clone, PartialEq)]
pub struct PaperPosition {
    pub asset: String,
    pub size: Decimal,
    pub invested: Decimal,
    pub avg_price: Decimal,
}

/// In-memory balance/position simulator
pub struct PaperTrader {
    balance: Decimal,
    positions: HashMap<String, PaperPosition>,
}

impl PaperTrader {
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            balance: initial_balance,
            positions: HashMap::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Conservative portfolio mark: Σ invested across open positions
    pub fn portfolio_value(&self) -> Decimal {
        self.positions.values().map(|p| p.invested).sum()
    }

    pub fn position(&self, condition_id: &str) -> Option<&PaperPosition> {
        self.positions.get(condition_id)
    }

    pub fn open_positions(&self) -> usize {
        self.positions.len()
    }

    /// Apply a trade to the book.
    ///
    /// BUY requires the balance to cover the notional; SELL requires the
    /// held size to cover the sold size. A position sold down to zero is
    /// removed.
    pub fn execute_trade(&mut self, queued: &QueueActivity) -> Result<(), TradeRefusal> {
        let activity = &queued.activity;
        match activity.side {
            Side::Buy => {
                if self.balance < activity.usdc_size {
                    return Err(TradeRefusal::InsufficientBalance {
                        available: self.balance,
                        required: activity.usdc_size,
                    });
                }

                self.balance -= activity.usdc_size;
                let position = self
                    .positions
                    .entry(activity.condition_id.clone())
                    .or_insert_with(|| PaperPosition {
                        asset: activity.asset.clone(),
                        size: Decimal::ZERO,
                        invested: Decimal::ZERO,
                        avg_price: Decimal::ZERO,
                    });
                position.size += activity.size;
                position.invested += activity.usdc_size;
                if position.size > Decimal::ZERO {
                    position.avg_price = position.invested / position.size;
                }

                tracing::info!(
                    condition_id = %activity.condition_id,
                    size = %activity.size,
                    usdc_size = %activity.usdc_size,
                    balance = %self.balance,
                    "Paper buy filled"
                );
            }
            Side::Sell => {
                let held = self
                    .positions
                    .get(&activity.condition_id)
                    .map(|p| p.size)
                    .unwrap_or(Decimal::ZERO);
                if held < activity.size {
                    return Err(TradeRefusal::InsufficientPosition {
                        held,
                        required: activity.size,
                    });
                }

                self.balance += activity.usdc_size;
                if let Some(position) = self.positions.get_mut(&activity.condition_id) {
                    position.invested =
                        (position.invested - activity.size * position.avg_price).max(Decimal::ZERO);
                    position.size -= activity.size;
                    if position.size.is_zero() {
                        self.positions.remove(&activity.condition_id);
                    }
                }

                tracing::info!(
                    condition_id = %activity.condition_id,
                    size = %activity.size,
                    usdc_size = %activity.usdc_size,
                    balance = %self.balance,
                    "Paper sell filled"
                );
            }
        }
        Ok(())
    }
}
