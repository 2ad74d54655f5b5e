//! Pipeline scenarios: fan-out, replay suppression, backlog and shutdown

use async_trait::async_trait;
use chrono::Utc;
use poly_copy::distributor::{Distributor, WorkerMessage};
use poly_copy::executor::{CopyOrder, ExecutorConfig, ExecutorWorker, OrderSubmitter};
use poly_copy::feed::{
    AccountLookup, Activity, ActivitySource, PositionData, QueueActivity, RawTimestamp, Side,
};
use poly_copy::monitor::{ActivityMonitor, DedupCache, PollerConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

/// Feed stub that replays the same activity list on every poll
struct ScriptedFeed {
    activities: Vec<Activity>,
}

#[async_trait]
impl ActivitySource for ScriptedFeed {
    async fn recent_trades(&self, _address: &str) -> anyhow::Result<Vec<Activity>> {
        Ok(self.activities.clone())
    }
}

#[async_trait]
impl AccountLookup for ScriptedFeed {
    async fn positions(&self, _address: &str) -> anyhow::Result<Vec<PositionData>> {
        Ok(vec![])
    }

    async fn usdc_balance(&self, _address: &str) -> anyhow::Result<Decimal> {
        Ok(Decimal::ZERO)
    }
}

#[derive(Default)]
struct RecordingSubmitter {
    orders: Mutex<Vec<CopyOrder>>,
}

#[async_trait]
impl OrderSubmitter for RecordingSubmitter {
    async fn submit(&self, order: &CopyOrder) -> anyhow::Result<()> {
        self.orders.lock().await.push(order.clone());
        Ok(())
    }
}

fn activity(tx_hash: &str) -> Activity {
    Activity {
        transaction_hash: Some(tx_hash.to_string()),
        condition_id: "0xcond".to_string(),
        asset: "token-1".to_string(),
        side: Side::Buy,
        price: dec!(0.5),
        size: dec!(10),
        usdc_size: dec!(5),
        // Freshly stamped so the age filter keeps it
        timestamp: RawTimestamp::Numeric(Utc::now().timestamp() as f64),
        slug: None,
        event_slug: None,
    }
}

fn queued(tx_hash: &str) -> QueueActivity {
    let now_ms = Utc::now().timestamp_millis();
    QueueActivity {
        activity: activity(tx_hash),
        user_address: "0xleader".to_string(),
        timestamp_ms: now_ms,
        detected_at_ms: now_ms,
    }
}

fn monitor(feed: Arc<ScriptedFeed>, distributor: Distributor) -> ActivityMonitor {
    ActivityMonitor::new(
        PollerConfig {
            user_addresses: vec!["0xleader".to_string()],
            fetch_interval: Duration::from_secs(1),
            max_age: Duration::from_secs(60),
        },
        feed.clone(),
        feed,
        DedupCache::new(Duration::from_secs(60), 5_000),
        distributor,
    )
}

fn tx_hash_of(message: WorkerMessage) -> Option<String> {
    match message {
        WorkerMessage::Activity(activity) => activity.activity.transaction_hash,
        WorkerMessage::Shutdown => None,
    }
}

#[tokio::test]
async fn test_six_activities_round_robin_across_three_workers() {
    let mut distributor = Distributor::new();
    let mut receivers = Vec::new();
    for id in 1..=3 {
        let (tx, rx) = mpsc::unbounded_channel();
        distributor.register(id, tx);
        receivers.push(rx);
    }

    let feed = Arc::new(ScriptedFeed {
        activities: (1..=6).map(|i| activity(&format!("0x{i:02}"))).collect(),
    });
    let mut monitor = monitor(feed, distributor);
    monitor.poll_once().await;

    let mut total = 0;
    for rx in receivers.iter_mut() {
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 2);
        total += count;
    }
    assert_eq!(total, 6);
}

#[tokio::test]
async fn test_replayed_activity_reaches_the_worker_once() {
    let mut distributor = Distributor::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    distributor.register(1, tx);

    let feed = Arc::new(ScriptedFeed {
        activities: vec![activity("0xABC")],
    });
    let mut monitor = monitor(feed, distributor);

    // The same activity comes back on the next poll cycle
    monitor.poll_once().await;
    monitor.poll_once().await;

    assert_eq!(tx_hash_of(rx.try_recv().unwrap()), Some("0xABC".to_string()));
    assert!(rx.try_recv().is_err());
    assert_eq!(monitor.distributor().published_count(), 1);
}

#[tokio::test]
async fn test_backlog_flushes_to_first_registered_worker() {
    let feed = Arc::new(ScriptedFeed {
        activities: vec![activity("0xBUF")],
    });
    let mut monitor = monitor(feed, Distributor::new());

    // No workers yet: the activity lands in the backlog
    monitor.poll_once().await;
    assert_eq!(monitor.distributor().backlog_len(), 1);

    let (tx, mut rx) = mpsc::unbounded_channel();
    monitor.distributor_mut().register(1, tx);

    assert_eq!(tx_hash_of(rx.try_recv().unwrap()), Some("0xBUF".to_string()));
    assert_eq!(monitor.distributor().backlog_len(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_broadcast_shutdown_terminates_worker() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let feed = Arc::new(ScriptedFeed { activities: vec![] });

    let mut distributor = Distributor::new();
    let (tx, rx) = mpsc::unbounded_channel();
    distributor.register(1, tx);

    let worker = ExecutorWorker::new(
        1,
        rx,
        feed,
        submitter.clone(),
        None,
        ExecutorConfig {
            proxy_wallet: "0xoperator".to_string(),
            aggregation_window: None,
        },
    );
    let handle = tokio::spawn(worker.run());

    distributor.broadcast_shutdown();

    // The dequeue loop must exit before the next 200 ms nap completes
    tokio::time::timeout(Duration::from_millis(400), handle)
        .await
        .expect("worker should acknowledge shutdown promptly")
        .unwrap();
}

#[tokio::test]
async fn test_distributed_activity_is_executed_by_worker() {
    let submitter = Arc::new(RecordingSubmitter::default());
    let feed = Arc::new(ScriptedFeed { activities: vec![] });

    let mut distributor = Distributor::new();
    let (tx, rx) = mpsc::unbounded_channel();
    distributor.register(1, tx);

    let worker = ExecutorWorker::new(
        1,
        rx,
        feed,
        submitter.clone(),
        None,
        ExecutorConfig {
            proxy_wallet: "0xoperator".to_string(),
            aggregation_window: None,
        },
    );
    let handle = tokio::spawn(worker.run());

    distributor.publish(queued("0xE2E"));

    // Give the worker a moment to dequeue and submit
    tokio::time::sleep(Duration::from_millis(300)).await;
    {
        let orders = submitter.orders.lock().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(
            orders[0].activity.activity.transaction_hash.as_deref(),
            Some("0xE2E")
        );
    }

    distributor.broadcast_shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}
