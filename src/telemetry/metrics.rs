//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Leader timestamp to local observation
    FeedAge,
    /// Detection to worker receipt
    QueueWait,
    /// Positions and balance lookups
    PositionFetch,
    /// Order submission round trip
    OrderSubmission,
    /// Leader timestamp to submitted order
    EndToEnd,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Activities handed to the worker pool
    ActivitiesPublished,
    /// Activities dropped as replays
    DuplicatesDropped,
    /// Activities dropped by the age filter
    StaleDropped,
    /// Activities dropped for unparseable timestamps
    MalformedDropped,
    /// Orders executed (live or paper)
    TradesExecuted,
    /// Trades skipped by the paper trader
    TradesSkipped,
    /// Aggregated orders flushed
    AggregatedFlushes,
    /// Aggregation records dropped below the minimum
    AggregationsDropped,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Paper trading balance
    PaperBalance,
    /// Open paper positions
    PaperPositions,
    /// Distributor backlog depth
    BacklogDepth,
    /// Registered worker count
    PoolSize,
    /// Live dedup cache entries
    DedupEntries,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::FeedAge => "polycopy_feed_age_ms",
        LatencyMetric::QueueWait => "polycopy_queue_wait_ms",
        LatencyMetric::PositionFetch => "polycopy_position_fetch_ms",
        LatencyMetric::OrderSubmission => "polycopy_order_submission_ms",
        LatencyMetric::EndToEnd => "polycopy_end_to_end_ms",
    };

    // TODO: Record to Prometheus histogram
    tracing::debug!(
        metric = metric_name,
        value_ms = duration.as_millis(),
        "Recording latency"
    );
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::ActivitiesPublished => "polycopy_activities_published_total",
        CounterMetric::DuplicatesDropped => "polycopy_duplicates_dropped_total",
        CounterMetric::StaleDropped => "polycopy_stale_dropped_total",
        CounterMetric::MalformedDropped => "polycopy_malformed_dropped_total",
        CounterMetric::TradesExecuted => "polycopy_trades_executed_total",
        CounterMetric::TradesSkipped => "polycopy_trades_skipped_total",
        CounterMetric::AggregatedFlushes => "polycopy_aggregated_flushes_total",
        CounterMetric::AggregationsDropped => "polycopy_aggregations_dropped_total",
    };

    // TODO: Increment Prometheus counter
    tracing::trace!(metric = metric_name, "Incrementing counter");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::PaperBalance => "polycopy_paper_balance_usd",
        GaugeMetric::PaperPositions => "polycopy_paper_positions",
        GaugeMetric::BacklogDepth => "polycopy_backlog_depth",
        GaugeMetric::PoolSize => "polycopy_pool_size",
        GaugeMetric::DedupEntries => "polycopy_dedup_entries",
    };

    // TODO: Set Prometheus gauge
    tracing::trace!(metric = metric_name, value = value, "Setting gauge");
}

/// Start the metrics endpoint
pub fn init_metrics_server(port: u16) -> anyhow::Result<()> {
    // TODO: Serve /metrics once the Prometheus registry is wired
    tracing::info!(port, "Metrics server configured");
    Ok(())
}
