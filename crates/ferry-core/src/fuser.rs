//! Joins schedule-derived lane identity with live vessel telemetry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ferry_client::LiveVessel;

use crate::cache::LastGoodLaneCache;
use crate::terminal::TerminalIds;
use crate::types::{Direction, Lane, LaneIdentity, LaneSource, Phase, Slot};

/// Fuse a schedule-derived lane identity with live vessel data.
#[allow(clippy::too_many_arguments)]
pub fn fuse(
    route_id: u32,
    identity: &LaneIdentity,
    live_by_id: &HashMap<u32, &LiveVessel>,
    terminals: TerminalIds,
    crossing_minutes: u32,
    cache: &LastGoodLaneCache,
    now: DateTime<Utc>,
) -> Lane {
    let Some(vessel) = live_by_id.get(&identity.vessel_id) else {
        return fuse_missing(route_id, identity.slot, cache, now);
    };

    let direction = resolve_direction(identity.slot, terminals, vessel);
    let left_dock = vessel.left_dock.or(vessel.scheduled_departure);
    let eta = vessel.eta.or_else(|| {
        left_dock.filter(|_| crossing_minutes > 0).map(|ld| {
            ld + chrono::Duration::minutes(i64::from(crossing_minutes))
        })
    });

    let dot_position = if vessel.at_dock {
        0.0
    } else {
        dot_position_for(now, left_dock, eta)
    };

    let phase = if vessel.at_dock {
        Phase::AtDock
    } else if eta.is_some() {
        Phase::Underway
    } else {
        Phase::Unknown
    };

    let lane = Lane {
        slot: identity.slot.number(),
        vessel_id: Some(vessel.vessel_id),
        vessel_name: vessel.vessel_name.clone(),
        at_dock: vessel.at_dock,
        direction,
        departing_terminal_id: vessel.departing_terminal_id,
        arriving_terminal_id: vessel.arriving_terminal_id,
        scheduled_departure: vessel.scheduled_departure,
        left_dock,
        eta,
        phase,
        dot_position,
        last_updated_vessels: now,
        dock_start_time: None,
        dock_start_is_synthetic: false,
        dock_arc_fraction: None,
        is_stale: false,
        source: LaneSource::Live,
    };

    cache.put(route_id, identity.slot, lane.clone(), now);
    lane
}

pub(crate) fn fuse_missing(
    route_id: u32,
    slot: Slot,
    cache: &LastGoodLaneCache,
    now: DateTime<Utc>,
) -> Lane {
    if let Some(mut cached) = cache.get(route_id, slot, now) {
        cached.is_stale = true;
        cached.last_updated_vessels = now;
        cached.source = LaneSource::Stale;
        apply_stale_snap(&mut cached, now);
        return cached;
    }

    Lane {
        slot: slot.number(),
        vessel_id: None,
        vessel_name: "Unknown".to_string(),
        at_dock: true,
        direction: slot.nominal_direction(),
        departing_terminal_id: None,
        arriving_terminal_id: None,
        scheduled_departure: None,
        left_dock: None,
        eta: None,
        phase: Phase::Unknown,
        dot_position: 0.0,
        last_updated_vessels: now,
        dock_start_time: None,
        dock_start_is_synthetic: false,
        dock_arc_fraction: None,
        is_stale: false,
        source: LaneSource::Missing,
    }
}

/// A lane that is stale and whose ETA has already passed snaps to docked,
/// so the UI never animates a phantom vessel past its arrival.
fn apply_stale_snap(lane: &mut Lane, now: DateTime<Utc>) {
    if let Some(eta) = lane.eta {
        if now > eta {
            lane.at_dock = true;
            lane.phase = Phase::AtDock;
            lane.dot_position = 1.0;
        }
    }
}

fn resolve_direction(slot: Slot, terminals: TerminalIds, vessel: &LiveVessel) -> Direction {
    match (
        vessel.departing_terminal_id,
        vessel.arriving_terminal_id,
        terminals.west_id,
        terminals.east_id,
    ) {
        (Some(dep), Some(arr), Some(west), Some(east)) if dep == west && arr == east => {
            Direction::WestToEast
        }
        (Some(dep), Some(arr), Some(west), Some(east)) if dep == east && arr == west => {
            Direction::EastToWest
        }
        _ => slot.nominal_direction(),
    }
}

/// `clamp((now - leftDock) / (eta - leftDock), 0, 1)`, guarded against
/// division by zero and missing inputs.
fn dot_position_for(
    now: DateTime<Utc>,
    left_dock: Option<DateTime<Utc>>,
    eta: Option<DateTime<Utc>>,
) -> f64 {
    let (Some(left_dock), Some(eta)) = (left_dock, eta) else {
        return 0.0;
    };

    if now < left_dock {
        return 0.0;
    }

    let span = (eta - left_dock).num_milliseconds();
    if span <= 0 {
        return 0.0;
    }

    let elapsed = (now - left_dock).num_milliseconds();
    (elapsed as f64 / span as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn vessel(id: u32, dep: Option<u32>, arr: Option<u32>, at_dock: bool) -> LiveVessel {
        LiveVessel {
            vessel_id: id,
            vessel_name: format!("Vessel {id}"),
            departing_terminal_id: dep,
            arriving_terminal_id: arr,
            at_dock,
            left_dock: None,
            eta: None,
            scheduled_departure: None,
            time_stamp: None,
        }
    }

    fn identity(slot: Slot, id: u32) -> LaneIdentity {
        LaneIdentity {
            slot,
            vessel_id: id,
            vessel_name: format!("Vessel {id}"),
        }
    }

    #[test]
    fn dot_position_is_zero_at_dock() {
        let now = Utc::now();
        let mut v = vessel(1, Some(3), Some(7), true);
        v.left_dock = Some(now - Duration::minutes(10));
        v.eta = Some(now + Duration::minutes(25));

        let by_id = HashMap::from([(1, &v)]);
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let lane = fuse(1, &identity(Slot::Upper, 1), &by_id, terminals, 35, &cache, now);
        assert_eq!(lane.dot_position, 0.0);
        assert_eq!(lane.phase, Phase::AtDock);
    }

    #[test]
    fn underway_direction_matches_forward_orientation() {
        let now = Utc::now();
        let mut v = vessel(1, Some(3), Some(7), false);
        v.left_dock = Some(now - Duration::minutes(10));
        v.eta = Some(now + Duration::minutes(25));

        let by_id = HashMap::from([(1, &v)]);
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let lane = fuse(1, &identity(Slot::Upper, 1), &by_id, terminals, 35, &cache, now);
        assert_eq!(lane.direction, Direction::WestToEast);
        assert!((lane.dot_position - 10.0 / 35.0).abs() < 1e-6);
        assert_eq!(lane.phase, Phase::Underway);
    }

    #[test]
    fn mismatched_terminals_fall_back_to_nominal_direction() {
        let now = Utc::now();
        let v = vessel(1, Some(99), Some(98), false);

        let by_id = HashMap::from([(1, &v)]);
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let lane = fuse(1, &identity(Slot::Lower, 1), &by_id, terminals, 35, &cache, now);
        assert_eq!(lane.direction, Direction::EastToWest);
    }

    #[test]
    fn missing_vessel_without_cache_is_degraded() {
        let now = Utc::now();
        let by_id: HashMap<u32, &LiveVessel> = HashMap::new();
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let lane = fuse(1, &identity(Slot::Upper, 42), &by_id, terminals, 35, &cache, now);
        assert_eq!(lane.vessel_name, "Unknown");
        assert!(lane.at_dock);
        assert_eq!(lane.phase, Phase::Unknown);
        assert_eq!(lane.source, LaneSource::Missing);
    }

    #[test]
    fn missing_vessel_with_fresh_cache_is_stale() {
        let now = Utc::now();
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let mut v = vessel(42, Some(3), Some(7), false);
        v.left_dock = Some(now - Duration::minutes(10));
        v.eta = Some(now + Duration::minutes(5));
        let by_id = HashMap::from([(42, &v)]);
        fuse(1, &identity(Slot::Upper, 42), &by_id, terminals, 35, &cache, now);

        let by_id_empty: HashMap<u32, &LiveVessel> = HashMap::new();
        let later = now + Duration::minutes(2);
        let lane = fuse(1, &identity(Slot::Upper, 42), &by_id_empty, terminals, 35, &cache, later);

        assert!(lane.is_stale);
        assert_eq!(lane.last_updated_vessels, later);
        assert_eq!(lane.source, LaneSource::Stale);
    }

    #[test]
    fn stale_past_eta_snaps_to_dock() {
        let now = Utc::now();
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let mut v = vessel(42, Some(3), Some(7), false);
        v.left_dock = Some(now - Duration::minutes(10));
        v.eta = Some(now + Duration::minutes(2));
        let by_id = HashMap::from([(42, &v)]);
        fuse(1, &identity(Slot::Upper, 42), &by_id, terminals, 35, &cache, now);

        let by_id_empty: HashMap<u32, &LiveVessel> = HashMap::new();
        let later = now + Duration::minutes(5); // now past the cached eta
        let lane = fuse(1, &identity(Slot::Upper, 42), &by_id_empty, terminals, 35, &cache, later);

        assert!(lane.is_stale);
        assert!(lane.at_dock);
        assert_eq!(lane.phase, Phase::AtDock);
        assert_eq!(lane.dot_position, 1.0);
    }

    #[test]
    fn equal_left_dock_and_eta_does_not_divide_by_zero() {
        let now = Utc::now();
        let mut v = vessel(1, Some(3), Some(7), false);
        v.left_dock = Some(now);
        v.eta = Some(now);

        let by_id = HashMap::from([(1, &v)]);
        let cache = LastGoodLaneCache::new();
        let terminals = TerminalIds {
            west_id: Some(3),
            east_id: Some(7),
        };

        let lane = fuse(1, &identity(Slot::Upper, 1), &by_id, terminals, 35, &cache, now);
        assert_eq!(lane.dot_position, 0.0);
    }
}
