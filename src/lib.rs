//! poly-copy: Copy-trading pipeline for Polymarket prediction markets
//!
//! This library provides the core components for:
//! - Polling leader trade activity from the Polymarket data API
//! - Timestamp normalisation, age filtering and replay suppression
//! - Round-robin fan-out to a pool of executor workers
//! - Sub-minimum trade aggregation per market
//! - Paper/live order execution
//! - Full observability stack

pub mod cli;
pub mod config;
pub mod distributor;
pub mod executor;
pub mod feed;
pub mod monitor;
pub mod telemetry;
