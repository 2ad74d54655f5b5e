//! Activity feed types

use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric timestamps above this are already in milliseconds
const MILLIS_THRESHOLD: f64 = 1_000_000_000_000.0;

/// Trade side as reported by the activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Lowercase word used on the order-submission path
    pub fn as_order_word(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Raw feed timestamp: epoch number (seconds or milliseconds) or ISO-8601 text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Numeric(f64),
    Text(String),
}

impl RawTimestamp {
    /// Normalise to epoch milliseconds.
    ///
    /// Numeric values above 10^12 are taken as milliseconds, anything else
    /// as seconds. Text must parse as ISO-8601; everything else is `None`
    /// and the activity is dropped upstream.
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            RawTimestamp::Numeric(n) if n.is_finite() && *n > 0.0 => {
                if *n > MILLIS_THRESHOLD {
                    Some(*n as i64)
                } else {
                    Some((*n * 1000.0) as i64)
                }
            }
            RawTimestamp::Numeric(_) => None,
            RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.timestamp_millis()),
        }
    }
}

/// One leader trade event from the activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// On-chain transaction hash; primary identity when present
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// Market identifier
    pub condition_id: String,
    /// Outcome token identifier
    pub asset: String,
    pub side: Side,
    /// Fractional probability in [0, 1]
    pub price: Decimal,
    /// Outcome-token units
    pub size: Decimal,
    /// Notional in USDC
    pub usdc_size: Decimal,
    pub timestamp: RawTimestamp,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub event_slug: Option<String>,
}

/// An activity accepted by the monitor, ready for the worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueActivity {
    pub activity: Activity,
    /// The monitored leader this trade belongs to
    pub user_address: String,
    /// Normalised trade timestamp in epoch milliseconds
    pub timestamp_ms: i64,
    /// Wall clock at detection, epoch milliseconds
    pub detected_at_ms: i64,
}

impl QueueActivity {
    /// Canonical replay-suppression key.
    ///
    /// The lowercased transaction hash when present, otherwise a composite
    /// of the fields that identify one fill.
    pub fn dedup_key(&self) -> String {
        match &self.activity.transaction_hash {
            Some(hash) if !hash.is_empty() => hash.to_lowercase(),
            _ => format!(
                "{}|{}|{}|{}|{}|{}",
                self.user_address,
                self.activity.condition_id,
                self.timestamp_ms,
                self.activity.side,
                self.activity.usdc_size,
                self.activity.price
            ),
        }
    }
}

/// One account position from the positions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    pub condition_id: String,
    pub asset: String,
    #[serde(default)]
    pub current_value: Decimal,
    #[serde(default)]
    pub initial_value: Decimal,
    #[serde(default)]
    pub percent_pnl: Decimal,
    #[serde(default)]
    pub size: Decimal,
    #[serde(default)]
    pub avg_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn queue_activity(transaction_hash: Option<&str>) -> QueueActivity {
        QueueActivity {
            activity: Activity {
                transaction_hash: transaction_hash.map(str::to_string),
                condition_id: "0xcond".to_string(),
                asset: "token-1".to_string(),
                side: Side::Buy,
                price: dec!(0.55),
                size: dec!(10),
                usdc_size: dec!(5.50),
                timestamp: RawTimestamp::Numeric(1_700_000_000.0),
                slug: None,
                event_slug: None,
            },
            user_address: "0xleader".to_string(),
            timestamp_ms: 1_700_000_000_000,
            detected_at_ms: 1_700_000_000_500,
        }
    }

    #[test]
    fn test_seconds_are_scaled_to_millis() {
        let ts = RawTimestamp::Numeric(1_700_000_000.0);
        assert_eq!(ts.to_millis(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_millis_pass_through() {
        let ts = RawTimestamp::Numeric(1_700_000_000_123.0);
        assert_eq!(ts.to_millis(), Some(1_700_000_000_123));
    }

    #[test]
    fn test_threshold_is_treated_as_seconds() {
        // Exactly 10^12 is still seconds; one past it is milliseconds
        let at = RawTimestamp::Numeric(1_000_000_000_000.0);
        assert_eq!(at.to_millis(), Some(1_000_000_000_000_000));

        let past = RawTimestamp::Numeric(1_000_000_000_001.0);
        assert_eq!(past.to_millis(), Some(1_000_000_000_001));
    }

    #[test]
    fn test_iso8601_text_timestamp() {
        let ts = RawTimestamp::Text("2024-01-01T00:00:00Z".to_string());
        assert_eq!(ts.to_millis(), Some(1_704_067_200_000));
    }

    #[test]
    fn test_unparseable_timestamp() {
        assert_eq!(RawTimestamp::Text("yesterday".to_string()).to_millis(), None);
        assert_eq!(RawTimestamp::Numeric(f64::NAN).to_millis(), None);
        assert_eq!(RawTimestamp::Numeric(-5.0).to_millis(), None);
    }

    #[test]
    fn test_dedup_key_prefers_transaction_hash() {
        let queued = queue_activity(Some("0xABCDEF"));
        assert_eq!(queued.dedup_key(), "0xabcdef");
    }

    #[test]
    fn test_dedup_key_composite_without_hash() {
        let queued = queue_activity(None);
        assert_eq!(
            queued.dedup_key(),
            "0xleader|0xcond|1700000000000|BUY|5.50|0.55"
        );
    }

    #[test]
    fn test_dedup_key_empty_hash_falls_back() {
        let queued = queue_activity(Some(""));
        assert!(queued.dedup_key().contains('|'));
    }

    #[test]
    fn test_activity_deserializes_feed_json() {
        let json = r#"{
            "transactionHash": "0x1234",
            "conditionId": "0xcond",
            "asset": "998877",
            "side": "BUY",
            "price": 0.42,
            "size": 12.5,
            "usdcSize": 5.25,
            "timestamp": 1700000000,
            "slug": "will-it-happen",
            "eventSlug": "big-event"
        }"#;

        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.transaction_hash.as_deref(), Some("0x1234"));
        assert_eq!(activity.side, Side::Buy);
        assert_eq!(activity.price, dec!(0.42));
        assert_eq!(activity.timestamp.to_millis(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_activity_deserializes_without_optional_fields() {
        let json = r#"{
            "conditionId": "0xcond",
            "asset": "998877",
            "side": "SELL",
            "price": 0.5,
            "size": 1,
            "usdcSize": 0.5,
            "timestamp": "2024-06-01T12:00:00Z"
        }"#;

        let activity: Activity = serde_json::from_str(json).unwrap();
        assert!(activity.transaction_hash.is_none());
        assert_eq!(activity.side, Side::Sell);
        assert!(activity.timestamp.to_millis().is_some());
    }

    #[test]
    fn test_side_order_word() {
        assert_eq!(Side::Buy.as_order_word(), "buy");
        assert_eq!(Side::Sell.as_order_word(), "sell");
    }
}
