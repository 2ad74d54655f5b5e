//! Configuration types for poly-copy

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub dedup: DedupConfig,
    pub aggregation: AggregationConfig,
    pub execution: ExecutionConfig,
    pub telemetry: TelemetryConfig,
}

/// Leader monitoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Leader addresses to watch, polled in order
    pub user_addresses: Vec<String>,
    /// Operator wallet address
    pub proxy_wallet: String,
    /// Seconds between poll cycles
    #[serde(default = "default_fetch_interval_secs")]
    pub fetch_interval_secs: u64,
    /// Maximum activity age in seconds
    pub too_old_seconds: u64,
}

/// Replay-suppression configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_dedup_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default = "default_dedup_max_entries")]
    pub max_entries: usize,
}

/// Sub-minimum trade aggregation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Coalescing window; required when aggregation is enabled
    pub window_seconds: Option<u64>,
}

/// Execution engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    /// Starting balance for paper trading; required in paper mode
    pub paper_balance_usd: Option<Decimal>,
    /// Executor worker pool size
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Passed through to the order submitter
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

/// Execution mode: paper trading or live
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Paper,
    Live,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub metrics_port: u16,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

fn default_fetch_interval_secs() -> u64 {
    1
}

fn default_dedup_ttl_seconds() -> u64 {
    60
}

fn default_dedup_max_entries() -> usize {
    5_000
}

fn default_workers() -> usize {
    4
}

fn default_retry_limit() -> u32 {
    3
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field requirements
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitor.user_addresses.is_empty() {
            anyhow::bail!("monitor.user_addresses must list at least one leader");
        }
        if self.monitor.proxy_wallet.is_empty() {
            anyhow::bail!("monitor.proxy_wallet is required");
        }
        if self.aggregation.enabled && self.aggregation.window_seconds.is_none() {
            anyhow::bail!("aggregation.window_seconds is required when aggregation is enabled");
        }
        if self.execution.mode == ExecutionMode::Paper && self.execution.paper_balance_usd.is_none()
        {
            anyhow::bail!("execution.paper_balance_usd is required in paper mode");
        }
        Ok(())
    }
}
