//! Leader positions cache
//!
//! Best-effort snapshot of leader positions refreshed once per poll cycle.
//! Unchanged rows are skipped via deep equality so a steady portfolio costs
//! nothing beyond the fetch.

use crate::feed::PositionData;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default entry lifetime
const POSITION_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheSlot {
    position: PositionData,
    refreshed_at: Instant,
}

/// TTL cache of positions keyed by `address|asset|conditionId`
pub struct PositionsCache {
    ttl: Duration,
    slots: HashMap<String, CacheSlot>,
}

impl PositionsCache {
    pub fn new() -> Self {
        Self::with_ttl(POSITION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: HashMap::new(),
        }
    }

    fn slot_key(address: &str, position: &PositionData) -> String {
        format!("{}|{}|{}", address, position.asset, position.condition_id)
    }

    /// Absorb a fresh snapshot for one address.
    ///
    /// Returns the number of slots whose value actually changed. Every
    /// observed slot has its freshness bumped; slots not refreshed within
    /// the TTL are purged.
    pub fn update(&mut self, address: &str, positions: &[PositionData]) -> usize {
        self.update_at(address, positions, Instant::now())
    }

    pub fn update_at(&mut self, address: &str, positions: &[PositionData], now: Instant) -> usize {
        let mut changed = 0;

        for position in positions {
            let key = Self::slot_key(address, position);
            match self.slots.get_mut(&key) {
                Some(slot) if slot.position == *position => {
                    slot.refreshed_at = now;
                }
                _ => {
                    self.slots.insert(
                        key,
                        CacheSlot {
                            position: position.clone(),
                            refreshed_at: now,
                        },
                    );
                    changed += 1;
                }
            }
        }

        let ttl = self.ttl;
        self.slots
            .retain(|_, slot| now.saturating_duration_since(slot.refreshed_at) < ttl);

        changed
    }

    /// Look up a live cached position
    pub fn get(&self, address: &str, asset: &str, condition_id: &str) -> Option<&PositionData> {
        self.get_at(address, asset, condition_id, Instant::now())
    }

    fn get_at(
        &self,
        address: &str,
        asset: &str,
        condition_id: &str,
        now: Instant,
    ) -> Option<&PositionData> {
        let key = format!("{}|{}|{}", address, asset, condition_id);
        self.slots
            .get(&key)
            .filter(|slot| now.saturating_duration_since(slot.refreshed_at) < self.ttl)
            .map(|slot| &slot.position)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for PositionsCache {
    fn default() -> Self {
        Self::new()
    }
}
