//! Aggregation scenarios: coalescing sub-minimum BUYs per market

use poly_copy::executor::{AggregationBuffer, MIN_TOTAL_USD};
use poly_copy::feed::{Activity, QueueActivity, RawTimestamp, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::{Duration, Instant};

fn buy(usdc_size: Decimal, price: Decimal) -> QueueActivity {
    QueueActivity {
        activity: Activity {
            transaction_hash: Some("0x01".to_string()),
            condition_id: "0xcond".to_string(),
            asset: "token-1".to_string(),
            side: Side::Buy,
            price,
            size: usdc_size / price,
            usdc_size,
            timestamp: RawTimestamp::Numeric(1_700_000_000.0),
            slug: Some("will-it-happen".to_string()),
            event_slug: None,
        },
        user_address: "0xleader".to_string(),
        timestamp_ms: 1_700_000_000_000,
        detected_at_ms: 1_700_000_000_100,
    }
}

#[test]
fn test_three_dust_buys_coalesce_into_one_order() {
    // Window 2 s; $0.40 + $0.30 + $0.40 at prices 0.5 / 0.6 / 0.5
    let mut buffer = AggregationBuffer::new(Duration::from_secs(2));
    let start = Instant::now();

    buffer.add_at(buy(dec!(0.40), dec!(0.5)), start);
    buffer.add_at(buy(dec!(0.30), dec!(0.6)), start);
    buffer.add_at(buy(dec!(0.40), dec!(0.5)), start);

    // Nothing flushes before the window elapses
    assert!(buffer
        .drain_ready_at(start + Duration::from_millis(1_500))
        .is_empty());

    let ready = buffer.drain_ready_at(start + Duration::from_secs(2));
    assert_eq!(ready.len(), 1);

    let synthetic = ready[0].to_activity().unwrap();
    assert_eq!(synthetic.activity.side, Side::Buy);
    assert_eq!(synthetic.activity.usdc_size, dec!(1.10));
    assert!(synthetic.activity.usdc_size >= MIN_TOTAL_USD);

    // Notional-weighted mean: (0.20 + 0.18 + 0.20) / 1.10 ~= 0.5273
    let expected = dec!(0.58) / dec!(1.10);
    assert_eq!(synthetic.activity.price, expected);
    assert!(synthetic.activity.price > dec!(0.527));
    assert!(synthetic.activity.price < dec!(0.528));

    // Every contributor is represented exactly once
    assert_eq!(ready[0].trade_count(), 3);
    assert_eq!(buffer.pending_count(), 0);
}

#[test]
fn test_lone_dust_buy_is_dropped_at_expiry() {
    let mut buffer = AggregationBuffer::new(Duration::from_secs(2));
    let start = Instant::now();

    buffer.add_at(buy(dec!(0.30), dec!(0.6)), start);

    let ready = buffer.drain_ready_at(start + Duration::from_secs(2));
    assert_eq!(ready.len(), 1);
    // Below the exchange minimum: the caller drops it, no order goes out
    assert!(ready[0].total_usdc_size < MIN_TOTAL_USD);
    // The record itself is gone either way
    assert_eq!(buffer.pending_count(), 0);
    assert!(buffer
        .drain_ready_at(start + Duration::from_secs(4))
        .is_empty());
}
