//! Run command implementation - the copy-trading pipeline

use crate::config::{Config, ExecutionMode};
use crate::distributor::Distributor;
use crate::executor::{ClobSubmitter, ExecutorConfig, ExecutorWorker, OrderSubmitter, PaperTrader};
use crate::feed::{AccountLookup, ActivitySource, DataApiClient};
use crate::monitor::{ActivityMonitor, DedupCache, PollerConfig};
use crate::telemetry::{self, GaugeMetric};
use anyhow::Result;
use clap::Args;
use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Executor worker pool size (overrides config)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Force paper trading regardless of the configured mode
    #[arg(long)]
    pub paper: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let mode = if self.paper {
            ExecutionMode::Paper
        } else {
            config.execution.mode
        };
        let worker_count = self.workers.unwrap_or(config.execution.workers).max(1);
        let aggregation_window = if config.aggregation.enabled {
            config.aggregation.window_seconds.map(Duration::from_secs)
        } else {
            None
        };

        tracing::info!(
            leaders = config.monitor.user_addresses.len(),
            workers = worker_count,
            mode = ?mode,
            aggregation = aggregation_window.is_some(),
            "Starting copy-trading pipeline"
        );

        let client = Arc::new(DataApiClient::new());
        let submitter: Arc<dyn OrderSubmitter> =
            Arc::new(ClobSubmitter::new(config.execution.retry_limit));

        // Spawn the worker pool and register every sink before polling starts
        let mut distributor = Distributor::new();
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let (tx, rx) = mpsc::unbounded_channel();
            let paper = match mode {
                ExecutionMode::Paper => Some(PaperTrader::new(
                    config.execution.paper_balance_usd.unwrap_or(dec!(1000)),
                )),
                ExecutionMode::Live => None,
            };
            let worker = ExecutorWorker::new(
                id,
                rx,
                client.clone() as Arc<dyn AccountLookup>,
                submitter.clone(),
                paper,
                ExecutorConfig {
                    proxy_wallet: config.monitor.proxy_wallet.clone(),
                    aggregation_window,
                },
            );
            distributor.register(id, tx);
            handles.push(tokio::spawn(worker.run()));
        }
        telemetry::set_gauge(GaugeMetric::PoolSize, worker_count as f64);

        let dedup = DedupCache::new(
            Duration::from_secs(config.dedup.ttl_seconds),
            config.dedup.max_entries,
        );
        let mut monitor = ActivityMonitor::new(
            PollerConfig::from(&config.monitor),
            client.clone() as Arc<dyn ActivitySource>,
            client as Arc<dyn AccountLookup>,
            dedup,
            distributor,
        );

        // Ctrl-C flips the stop flag; the monitor finishes its cycle first
        let stop = monitor.stop_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                stop.store(true, Ordering::Relaxed);
            }
        });

        monitor.run().await;

        monitor.distributor().broadcast_shutdown();
        for handle in handles {
            let _ = handle.await;
        }

        tracing::info!("Pipeline stopped");
        Ok(())
    }
}
