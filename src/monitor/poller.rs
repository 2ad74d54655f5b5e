//! Leader activity monitor
//!
//! Polls each configured leader's trade feed, normalises timestamps,
//! drops stale and replayed activity, and publishes the rest to the
//! distributor. Fetch failures skip the address for the cycle and never
//! stop the loop.

use super::{DedupCache, PositionsCache};
use crate::config;
use crate::distributor::Distributor;
use crate::feed::{AccountLookup, Activity, ActivitySource, QueueActivity};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monitor runtime settings
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Leader addresses, polled in order
    pub user_addresses: Vec<String>,
    /// Pause between poll cycles
    pub fetch_interval: Duration,
    /// Activities older than this are dropped
    pub max_age: Duration,
}

impl From<&config::MonitorConfig> for PollerConfig {
    fn from(config: &config::MonitorConfig) -> Self {
        Self {
            user_addresses: config.user_addresses.clone(),
            fetch_interval: Duration::from_secs(config.fetch_interval_secs),
            max_age: Duration::from_secs(config.too_old_seconds),
        }
    }
}

/// Polls leader activity and feeds the worker pool
pub struct ActivityMonitor {
    config: PollerConfig,
    source: Arc<dyn ActivitySource>,
    accounts: Arc<dyn AccountLookup>,
    dedup: DedupCache,
    positions: PositionsCache,
    distributor: Distributor,
    stop: Arc<AtomicBool>,
}

impl ActivityMonitor {
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn ActivitySource>,
        accounts: Arc<dyn AccountLookup>,
        dedup: DedupCache,
        distributor: Distributor,
    ) -> Self {
        Self {
            config,
            source,
            accounts,
            dedup,
            positions: PositionsCache::new(),
            distributor,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the loop after the current cycle
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn distributor(&self) -> &Distributor {
        &self.distributor
    }

    pub fn distributor_mut(&mut self) -> &mut Distributor {
        &mut self.distributor
    }

    /// Poll until the stop flag flips
    pub async fn run(&mut self) {
        tracing::info!(
            leaders = self.config.user_addresses.len(),
            interval_secs = self.config.fetch_interval.as_secs(),
            "Monitor started"
        );

        while !self.stop.load(Ordering::Relaxed) {
            self.poll_once().await;
            self.refresh_positions().await;
            tokio::time::sleep(self.config.fetch_interval).await;
        }

        tracing::info!(
            published = self.distributor.published_count(),
            "Monitor stopped"
        );
    }

    /// Run one poll cycle across all leaders
    pub async fn poll_once(&mut self) {
        let addresses = self.config.user_addresses.clone();
        for address in &addresses {
            match self.source.recent_trades(address).await {
                Ok(activities) => {
                    for activity in activities {
                        self.ingest(address, activity);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        address = %address,
                        error = %e,
                        "Activity fetch failed, skipping address this cycle"
                    );
                }
            }
        }
        telemetry::set_gauge(GaugeMetric::DedupEntries, self.dedup.len() as f64);
    }

    /// Best-effort refresh of the leader positions cache; failures never
    /// affect publishing
    pub async fn refresh_positions(&mut self) {
        let addresses = self.config.user_addresses.clone();
        for address in &addresses {
            match self.accounts.positions(address).await {
                Ok(positions) => {
                    let changed = self.positions.update(address, &positions);
                    if changed > 0 {
                        tracing::debug!(address = %address, changed, "Positions cache refreshed");
                    }
                }
                Err(e) => {
                    tracing::debug!(address = %address, error = %e, "Positions refresh failed");
                }
            }
        }
    }

    fn ingest(&mut self, address: &str, activity: Activity) {
        let Some(timestamp_ms) = activity.timestamp.to_millis() else {
            telemetry::increment_counter(CounterMetric::MalformedDropped);
            tracing::debug!(
                condition_id = %activity.condition_id,
                "Dropping activity with unparseable timestamp"
            );
            return;
        };
        self.ingest_at(address, activity, timestamp_ms, Utc::now().timestamp_millis());
    }

    fn ingest_at(&mut self, address: &str, activity: Activity, timestamp_ms: i64, now_ms: i64) {
        let max_age_ms = self.config.max_age.as_millis() as i64;
        if now_ms - timestamp_ms > max_age_ms {
            telemetry::increment_counter(CounterMetric::StaleDropped);
            tracing::debug!(
                condition_id = %activity.condition_id,
                age_ms = now_ms - timestamp_ms,
                "Dropping stale activity"
            );
            return;
        }

        let queued = QueueActivity {
            activity,
            user_address: address.to_string(),
            timestamp_ms,
            detected_at_ms: now_ms,
        };

        let key = queued.dedup_key();
        if !self.dedup.check_and_remember(&key) {
            telemetry::increment_counter(CounterMetric::DuplicatesDropped);
            tracing::trace!(key = %key, "Dropping replayed activity");
            return;
        }

        telemetry::increment_counter(CounterMetric::ActivitiesPublished);
        tracing::info!(
            leader = %queued.user_address,
            condition_id = %queued.activity.condition_id,
            side = %queued.activity.side,
            usdc_size = %queued.activity.usdc_size,
            age_ms = now_ms - timestamp_ms,
            "New leader trade detected"
        );
        self.distributor.publish(queued);
    }
}
