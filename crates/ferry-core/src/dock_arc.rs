//! Per-route, per-slot dock memory: dock-start time and elapsed fraction.
//!
//! This is the only state that must survive across requests to avoid
//! losing the "moment of docking" observation.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::types::{Lane, Slot};

/// Boot-synthesis lookback: a docked vessel observed with no prior history
/// is assumed to have docked 25 minutes before its scheduled departure.
const BOOT_LOOKBACK: chrono::Duration = chrono::Duration::minutes(25);
const DOCK_ARC_WINDOW: chrono::Duration = chrono::Duration::hours(1);

#[derive(Debug, Clone, Copy)]
struct DockMemory {
    at_dock: bool,
    dock_start_time: Option<DateTime<Utc>>,
    synthetic: bool,
}

/// Process-wide dock-arc memory, one entry per (route, slot).
#[derive(Default)]
pub struct DockArcTracker {
    memory: DashMap<(u32, Slot), DockMemory>,
}

impl DockArcTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate `lane` with dock-start time, synthetic flag, and dock-arc
    /// fraction, updating the persisted memory for this (route, slot).
    pub fn process(&self, route_id: u32, slot: Slot, lane: &mut Lane, now: DateTime<Utc>) {
        let key = (route_id, slot);

        // A lane forced to "at dock" by the stale-snap rule is not a
        // genuine dock observation. Leave the arc unset and don't touch
        // persisted memory; wait for the next live observation.
        if lane.is_stale {
            lane.dock_start_time = None;
            lane.dock_start_is_synthetic = false;
            lane.dock_arc_fraction = None;
            return;
        }

        if !lane.at_dock {
            lane.dock_start_time = None;
            lane.dock_start_is_synthetic = false;
            lane.dock_arc_fraction = None;
            self.memory.insert(
                key,
                DockMemory {
                    at_dock: false,
                    dock_start_time: None,
                    synthetic: false,
                },
            );
            return;
        }

        let prev = self.memory.get(&key).map(|r| *r);
        let (dock_start_time, synthetic) = match prev {
            Some(DockMemory {
                at_dock: true,
                dock_start_time: Some(ts),
                synthetic,
            }) => (ts, synthetic),
            Some(DockMemory { at_dock: false, .. }) => (now, false),
            _ => {
                let synth = lane
                    .scheduled_departure
                    .map_or(now, |sd| (sd - BOOT_LOOKBACK).min(now));
                (synth, true)
            }
        };

        lane.dock_start_time = Some(dock_start_time);
        lane.dock_start_is_synthetic = synthetic;
        lane.dock_arc_fraction = Some(dock_arc_fraction(now, dock_start_time));

        self.memory.insert(
            key,
            DockMemory {
                at_dock: true,
                dock_start_time: Some(dock_start_time),
                synthetic,
            },
        );
    }
}

fn dock_arc_fraction(now: DateTime<Utc>, dock_start_time: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - dock_start_time).num_milliseconds().max(0);
    (elapsed_ms as f64 / DOCK_ARC_WINDOW.num_milliseconds() as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, LaneSource, Phase};
    use chrono::Duration;

    fn lane(at_dock: bool, scheduled_departure: Option<DateTime<Utc>>) -> Lane {
        Lane {
            slot: 1,
            vessel_id: Some(1),
            vessel_name: "Test".to_string(),
            at_dock,
            direction: Direction::WestToEast,
            departing_terminal_id: Some(3),
            arriving_terminal_id: Some(7),
            scheduled_departure,
            left_dock: None,
            eta: None,
            phase: Phase::Unknown,
            dot_position: 0.0,
            last_updated_vessels: Utc::now(),
            dock_start_time: None,
            dock_start_is_synthetic: false,
            dock_arc_fraction: None,
            is_stale: false,
            source: LaneSource::Live,
        }
    }

    #[test]
    fn boot_synthesizes_from_scheduled_departure() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();
        let mut l = lane(true, Some(now + Duration::minutes(10)));

        tracker.process(1, Slot::Upper, &mut l, now);

        assert!(l.dock_start_is_synthetic);
        assert_eq!(l.dock_start_time, Some(now - Duration::minutes(15)));
        assert!((l.dock_arc_fraction.unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn boot_clamps_future_synthetic_start_to_now() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();
        let mut l = lane(true, Some(now + Duration::minutes(60)));

        tracker.process(1, Slot::Upper, &mut l, now);

        assert_eq!(l.dock_start_time, Some(now));
        assert_eq!(l.dock_arc_fraction, Some(0.0));
    }

    #[test]
    fn boot_uses_now_when_scheduled_departure_absent() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();
        let mut l = lane(true, None);

        tracker.process(1, Slot::Upper, &mut l, now);

        assert_eq!(l.dock_start_time, Some(now));
        assert!(l.dock_start_is_synthetic);
    }

    #[test]
    fn real_transition_records_now_not_synthetic() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();

        let mut not_docked = lane(false, None);
        tracker.process(1, Slot::Upper, &mut not_docked, now);

        let later = now + Duration::minutes(3);
        let mut docked = lane(true, None);
        tracker.process(1, Slot::Upper, &mut docked, later);

        assert_eq!(docked.dock_start_time, Some(later));
        assert!(!docked.dock_start_is_synthetic);
    }

    #[test]
    fn repeated_docked_observation_keeps_original_start() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();

        let mut first = lane(true, None);
        tracker.process(1, Slot::Upper, &mut first, now);
        let original_start = first.dock_start_time;

        let later = now + Duration::minutes(20);
        let mut second = lane(true, None);
        tracker.process(1, Slot::Upper, &mut second, later);

        assert_eq!(second.dock_start_time, original_start);
        assert!((second.dock_arc_fraction.unwrap() - 20.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn leaving_dock_clears_fields() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();

        let mut docked = lane(true, None);
        tracker.process(1, Slot::Upper, &mut docked, now);

        let mut underway = lane(false, None);
        tracker.process(1, Slot::Upper, &mut underway, now + Duration::minutes(1));

        assert!(underway.dock_start_time.is_none());
        assert!(underway.dock_arc_fraction.is_none());
    }

    #[test]
    fn stale_snap_leaves_dock_start_unset() {
        let now = Utc::now();
        let tracker = DockArcTracker::new();

        let mut stale_docked = lane(true, None);
        stale_docked.is_stale = true;

        tracker.process(1, Slot::Upper, &mut stale_docked, now);

        assert!(stale_docked.dock_start_time.is_none());
        assert!(stale_docked.dock_arc_fraction.is_none());
    }
}
