//! Activity distributor and worker pool registry
//!
//! Routes accepted activities round-robin across the registered executor
//! workers. With no workers registered, activities queue in a FIFO backlog
//! that drains as soon as the first worker arrives.

use crate::feed::QueueActivity;
use crate::telemetry::{self, GaugeMetric};
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Control-plane message delivered to a worker's queue
#[derive(Debug)]
pub enum WorkerMessage {
    Activity(QueueActivity),
    Shutdown,
}

/// A registered worker: its id and the sending half of its local queue
struct WorkerEndpoint {
    id: usize,
    sink: mpsc::UnboundedSender<WorkerMessage>,
}

/// Round-robin distributor over a mutable worker registry.
///
/// The cursor is a monotonically increasing counter taken modulo the
/// registry size captured at selection time; it never resets on membership
/// changes, so fairness is eventually-even rather than strictly balanced
/// (per-worker receive counts can differ transiently around registration
/// and removal).
pub struct Distributor {
    workers: Vec<WorkerEndpoint>,
    cursor: u64,
    backlog: VecDeque<QueueActivity>,
    published: u64,
}

impl Distributor {
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
            cursor: 0,
            backlog: VecDeque::new(),
            published: 0,
        }
    }

    /// Add a worker and drain any buffered activities to the pool
    pub fn register(&mut self, id: usize, sink: mpsc::UnboundedSender<WorkerMessage>) {
        self.workers.push(WorkerEndpoint { id, sink });
        tracing::info!(
            worker_id = id,
            pool_size = self.workers.len(),
            "Worker registered"
        );
        self.drain_backlog();
    }

    /// Remove a worker; messages already on its queue are not recalled
    pub fn unregister(&mut self, id: usize) {
        self.workers.retain(|worker| worker.id != id);
        tracing::info!(
            worker_id = id,
            pool_size = self.workers.len(),
            "Worker unregistered"
        );
    }

    /// Hand an activity to the next worker, or buffer it when none are
    /// registered. Delivery is fire-and-forget.
    pub fn publish(&mut self, activity: QueueActivity) {
        if self.workers.is_empty() {
            self.backlog.push_back(activity);
            telemetry::set_gauge(GaugeMetric::BacklogDepth, self.backlog.len() as f64);
            tracing::debug!(backlog = self.backlog.len(), "No workers ready, buffering");
            return;
        }
        self.dispatch(activity);
    }

    /// Send a shutdown message to every registered worker
    pub fn broadcast_shutdown(&self) {
        for worker in &self.workers {
            let _ = worker.sink.send(WorkerMessage::Shutdown);
        }
        tracing::info!(pool_size = self.workers.len(), "Shutdown broadcast");
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Activities handed to a worker since startup
    pub fn published_count(&self) -> u64 {
        self.published
    }

    fn dispatch(&mut self, activity: QueueActivity) {
        let index = (self.cursor % self.workers.len() as u64) as usize;
        self.cursor += 1;

        let worker = &self.workers[index];
        match worker.sink.send(WorkerMessage::Activity(activity)) {
            Ok(()) => self.published += 1,
            Err(_) => {
                tracing::warn!(worker_id = worker.id, "Worker sink closed, dropping activity");
            }
        }
    }

    fn drain_backlog(&mut self) {
        if self.workers.is_empty() || self.backlog.is_empty() {
            return;
        }
        let drained = self.backlog.len();
        while let Some(activity) = self.backlog.pop_front() {
            self.dispatch(activity);
        }
        telemetry::set_gauge(GaugeMetric::BacklogDepth, 0.0);
        tracing::info!(drained, "Backlog drained to worker pool");
    }
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new()
    }
}
