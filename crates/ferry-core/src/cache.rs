//! Per-route, per-lane last-good cache.
//!
//! Lets the assembler reuse the previous successful lane observation when
//! the live feed no longer carries it, within a TTL. No eviction sweep is
//! needed: entries are only ever read through `get`, which performs its
//! own freshness check.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::types::{Lane, Slot};

/// Lane cache TTL.
pub const LANE_TTL: chrono::Duration = chrono::Duration::minutes(10);

struct CachedLane {
    lane: Lane,
    observed_at: DateTime<Utc>,
}

/// Process-wide last-good lane cache, one entry per (route, slot).
#[derive(Default)]
pub struct LastGoodLaneCache {
    entries: DashMap<(u32, Slot), CachedLane>,
}

impl LastGoodLaneCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached lane if it is still within the TTL.
    #[must_use]
    pub fn get(&self, route_id: u32, slot: Slot, now: DateTime<Utc>) -> Option<Lane> {
        let entry = self.entries.get(&(route_id, slot))?;
        if now - entry.observed_at <= LANE_TTL {
            Some(entry.lane.clone())
        } else {
            None
        }
    }

    /// Record a fresh live observation. Writes a shallow copy so callers
    /// can't mutate the cache through the lane they passed in.
    pub fn put(&self, route_id: u32, slot: Slot, lane: Lane, observed_at: DateTime<Utc>) {
        self.entries
            .insert((route_id, slot), CachedLane { lane, observed_at });
    }
}
