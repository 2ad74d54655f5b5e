//! Executor worker loop
//!
//! Each worker owns one local queue, one aggregation buffer and (in paper
//! mode) one simulator instance. Nothing here is shared with other
//! workers, so the loop is free of locks: non-blocking dequeue, a short
//! nap when idle, and a periodic flush of ready aggregation windows.

use super::aggregation::{AggregationBuffer, AGG_CHECK_INTERVAL, MIN_TOTAL_USD};
use super::paper::PaperTrader;
use super::{CopyOrder, OrderSubmitter};
use crate::distributor::WorkerMessage;
use crate::feed::{AccountLookup, QueueActivity};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Nap between polls of an empty queue
pub const IDLE_NAP: Duration = Duration::from_millis(200);

/// Worker runtime settings
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Operator wallet the mirrored orders trade from
    pub proxy_wallet: String,
    /// Aggregation window; `None` disables the buffer entirely
    pub aggregation_window: Option<Duration>,
}

/// One executor worker: dequeues activities and turns them into orders
pub struct ExecutorWorker {
    id: usize,
    queue: mpsc::UnboundedReceiver<WorkerMessage>,
    accounts: Arc<dyn AccountLookup>,
    submitter: Arc<dyn OrderSubmitter>,
    paper: Option<PaperTrader>,
    aggregation: Option<AggregationBuffer>,
    config: ExecutorConfig,
    received: u64,
}

impl ExecutorWorker {
    pub fn new(
        id: usize,
        queue: mpsc::UnboundedReceiver<WorkerMessage>,
        accounts: Arc<dyn AccountLookup>,
        submitter: Arc<dyn OrderSubmitter>,
        paper: Option<PaperTrader>,
        config: ExecutorConfig,
    ) -> Self {
        let aggregation = config.aggregation_window.map(AggregationBuffer::new);
        Self {
            id,
            queue,
            accounts,
            submitter,
            paper,
            aggregation,
            config,
            received: 0,
        }
    }

    /// Dequeue until shutdown. Runs as its own tokio task.
    pub async fn run(mut self) {
        tracing::info!(
            worker_id = self.id,
            aggregation = self.aggregation.is_some(),
            paper = self.paper.is_some(),
            "Worker started"
        );

        let mut last_flush = Instant::now();

        loop {
            match self.queue.try_recv() {
                Ok(WorkerMessage::Activity(queued)) => {
                    self.received += 1;
                    self.handle(queued).await;
                }
                Ok(WorkerMessage::Shutdown) => {
                    tracing::info!(
                        worker_id = self.id,
                        received = self.received,
                        "Shutdown acknowledged"
                    );
                    break;
                }
                Err(TryRecvError::Empty) => {
                    tokio::time::sleep(IDLE_NAP).await;
                }
                Err(TryRecvError::Disconnected) => {
                    tracing::info!(worker_id = self.id, "Distributor gone, worker exiting");
                    break;
                }
            }

            // Flushes are serialised: this is the only place windows drain
            if last_flush.elapsed() >= AGG_CHECK_INTERVAL {
                self.flush_ready().await;
                last_flush = Instant::now();
            }
        }
    }

    async fn handle(&mut self, queued: QueueActivity) {
        if self.aggregation.is_some() && AggregationBuffer::is_candidate(&queued) {
            tracing::debug!(
                worker_id = self.id,
                condition_id = %queued.activity.condition_id,
                usdc_size = %queued.activity.usdc_size,
                "Buffering sub-minimum trade for aggregation"
            );
            if let Some(buffer) = self.aggregation.as_mut() {
                buffer.add(queued);
            }
            return;
        }
        self.execute(queued).await;
    }

    async fn flush_ready(&mut self) {
        let Some(buffer) = self.aggregation.as_mut() else {
            return;
        };

        for trade in buffer.drain_ready() {
            if trade.total_usdc_size >= MIN_TOTAL_USD {
                let Some(synthetic) = trade.to_activity() else {
                    continue;
                };
                telemetry::increment_counter(CounterMetric::AggregatedFlushes);
                tracing::info!(
                    worker_id = self.id,
                    trades = trade.trade_count(),
                    usdc_size = %trade.total_usdc_size,
                    average_price = %trade.average_price,
                    "Flushing aggregated trade as one order"
                );
                self.execute(synthetic).await;
            } else {
                telemetry::increment_counter(CounterMetric::AggregationsDropped);
                tracing::info!(
                    worker_id = self.id,
                    trades = trade.trade_count(),
                    usdc_size = %trade.total_usdc_size,
                    "Aggregation window expired below minimum, dropping"
                );
            }
        }
    }

    async fn execute(&mut self, queued: QueueActivity) {
        let received_at_ms = Utc::now().timestamp_millis();
        let feed_age_ms = (received_at_ms - queued.timestamp_ms).max(0) as u64;
        let queue_wait_ms = (received_at_ms - queued.detected_at_ms).max(0) as u64;
        telemetry::record_latency(LatencyMetric::FeedAge, Duration::from_millis(feed_age_ms));
        telemetry::record_latency(
            LatencyMetric::QueueWait,
            Duration::from_millis(queue_wait_ms),
        );

        if let Some(paper) = self.paper.as_mut() {
            match paper.execute_trade(&queued) {
                Ok(()) => {
                    telemetry::increment_counter(CounterMetric::TradesExecuted);
                    telemetry::set_gauge(
                        GaugeMetric::PaperBalance,
                        paper.balance().to_f64().unwrap_or(0.0),
                    );
                    telemetry::set_gauge(
                        GaugeMetric::PaperPositions,
                        paper.open_positions() as f64,
                    );
                }
                Err(refusal) => {
                    telemetry::increment_counter(CounterMetric::TradesSkipped);
                    tracing::info!(
                        worker_id = self.id,
                        condition_id = %queued.activity.condition_id,
                        reason = %refusal,
                        "Paper trade skipped"
                    );
                }
            }
            let total_ms = (Utc::now().timestamp_millis() - queued.timestamp_ms).max(0) as u64;
            telemetry::record_latency(LatencyMetric::EndToEnd, Duration::from_millis(total_ms));
            tracing::info!(
                worker_id = self.id,
                feed_age_ms,
                queue_wait_ms,
                total_ms,
                "Paper execution latency"
            );
            return;
        }

        if let Err(e) = self.submit_live(&queued, feed_age_ms, queue_wait_ms).await {
            tracing::error!(
                worker_id = self.id,
                condition_id = %queued.activity.condition_id,
                error = %e,
                "Order submission failed, continuing"
            );
        }
    }

    async fn submit_live(
        &self,
        queued: &QueueActivity,
        feed_age_ms: u64,
        queue_wait_ms: u64,
    ) -> anyhow::Result<()> {
        let fetch_started = Instant::now();
        let (own_positions, leader_positions, own_balance) = tokio::join!(
            self.accounts.positions(&self.config.proxy_wallet),
            self.accounts.positions(&queued.user_address),
            self.accounts.usdc_balance(&self.config.proxy_wallet),
        );
        let own_positions = own_positions?;
        let leader_positions = leader_positions?;
        let own_balance = own_balance?;
        let fetch_elapsed = fetch_started.elapsed();
        telemetry::record_latency(LatencyMetric::PositionFetch, fetch_elapsed);

        let condition_id = &queued.activity.condition_id;
        let own_position = own_positions
            .iter()
            .find(|p| p.condition_id == *condition_id)
            .cloned();
        let leader_position = leader_positions
            .iter()
            .find(|p| p.condition_id == *condition_id)
            .cloned();
        let leader_balance: Decimal = leader_positions.iter().map(|p| p.current_value).sum();

        let order = CopyOrder {
            side: queued.activity.side,
            own_position,
            leader_position,
            activity: queued.clone(),
            own_balance,
            leader_balance,
            leader_address: queued.user_address.clone(),
        };

        let order_started = Instant::now();
        self.submitter.submit(&order).await?;
        let order_elapsed = order_started.elapsed();
        telemetry::record_latency(LatencyMetric::OrderSubmission, order_elapsed);
        telemetry::increment_counter(CounterMetric::TradesExecuted);

        let total_ms = (Utc::now().timestamp_millis() - queued.timestamp_ms).max(0) as u64;
        telemetry::record_latency(LatencyMetric::EndToEnd, Duration::from_millis(total_ms));
        tracing::info!(
            worker_id = self.id,
            feed_age_ms,
            queue_wait_ms,
            fetch_ms = fetch_elapsed.as_millis() as u64,
            order_ms = order_elapsed.as_millis() as u64,
            total_ms,
            "Copy order submitted"
        );

        Ok(())
    }
}
