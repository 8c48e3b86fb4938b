//! Per-side drive-on vehicle capacity for the next departing sailing.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ferry_client::TerminalSpace;

use crate::cache::LANE_TTL;
use crate::types::{Capacity, Side};

struct CachedCapacity {
    capacity: Capacity,
    observed_at: DateTime<Utc>,
}

struct Candidate {
    departure: DateTime<Utc>,
    vessel_id: u32,
    vessel_name: String,
    raw_max: Option<i64>,
    drive_up: Option<i64>,
}

/// Per-vessel sticky maxima and per-side last-good capacity, shared across
/// requests for the lifetime of the process.
#[derive(Default)]
pub struct CapacityDeriver {
    sticky_max: DashMap<u32, i64>,
    last_good: DashMap<(u32, Side), CachedCapacity>,
}

impl CapacityDeriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive capacity for one side of a route.
    #[allow(clippy::too_many_arguments)]
    pub fn derive(
        &self,
        route_id: u32,
        side: Side,
        spaces: &[TerminalSpace],
        side_terminal_id: Option<u32>,
        opposite_terminal_id: Option<u32>,
        scheduled_vessel_id: Option<u32>,
        now: DateTime<Utc>,
    ) -> Capacity {
        let candidates = candidates_for(spaces, side_terminal_id, opposite_terminal_id, now);

        let matched = scheduled_vessel_id.and_then(|vid| {
            candidates
                .iter()
                .find(|c| c.vessel_id == vid && c.drive_up.is_some())
        });
        let fallback = candidates.iter().find(|c| c.drive_up.is_some());
        let chosen = matched.or(fallback);
        let used_nonmatching_fallback = matched.is_none() && chosen.is_some();

        let Some(chosen) = chosen else {
            return self
                .last_good_within_ttl(route_id, side, now)
                .map(|mut c| {
                    c.last_updated = now;
                    c.is_stale = true;
                    c
                })
                .unwrap_or_else(|| Capacity {
                    terminal_id: side_terminal_id,
                    vessel_id: None,
                    vessel_name: None,
                    max_auto: None,
                    avail_auto: None,
                    last_updated: now,
                    is_stale: true,
                });
        };

        if let Some(raw_max) = chosen.raw_max {
            if raw_max > 0 {
                self.sticky_max.entry(chosen.vessel_id).or_insert(raw_max);
            }
        }
        let max_auto = self.sticky_max.get(&chosen.vessel_id).map(|v| *v);

        let (avail_auto, avail_from_fallback) = match chosen.drive_up {
            Some(v) => (Some(v), false),
            None => match self.last_good_within_ttl(route_id, side, now) {
                Some(cached) => (cached.avail_auto, true),
                None => (None, false),
            },
        };

        let capacity = Capacity {
            terminal_id: side_terminal_id,
            vessel_id: Some(chosen.vessel_id),
            vessel_name: Some(chosen.vessel_name.clone()),
            max_auto,
            avail_auto,
            last_updated: now,
            is_stale: used_nonmatching_fallback || avail_from_fallback,
        };

        self.last_good.insert(
            (route_id, side),
            CachedCapacity {
                capacity: capacity.clone(),
                observed_at: now,
            },
        );

        capacity
    }

    fn last_good_within_ttl(&self, route_id: u32, side: Side, now: DateTime<Utc>) -> Option<Capacity> {
        let entry = self.last_good.get(&(route_id, side))?;
        (now - entry.observed_at <= LANE_TTL).then(|| entry.capacity.clone())
    }
}

fn candidates_for(
    spaces: &[TerminalSpace],
    side_terminal_id: Option<u32>,
    opposite_terminal_id: Option<u32>,
    now: DateTime<Utc>,
) -> Vec<Candidate> {
    let (Some(side_id), Some(opposite_id)) = (side_terminal_id, opposite_terminal_id) else {
        return Vec::new();
    };

    let mut candidates: Vec<Candidate> = spaces
        .iter()
        .filter(|t| t.terminal_id == side_id)
        .flat_map(|t| &t.departing_spaces)
        .filter_map(|d| {
            let departure = d.departure?;
            if departure < now {
                return None;
            }
            d.space_for_arrival_terminals
                .iter()
                .find(|a| a.arrival_terminal_id == opposite_id)
                .map(|a| Candidate {
                    departure,
                    vessel_id: d.vessel_id,
                    vessel_name: d.vessel_name.clone(),
                    raw_max: a.max_space_count,
                    drive_up: a.drive_up_space_count,
                })
        })
        .collect();

    candidates.sort_by_key(|c| c.departure);
    candidates
}
