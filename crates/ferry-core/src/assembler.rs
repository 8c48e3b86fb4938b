//! Orchestrates the catalog, resolver, client, and derivers into a snapshot.

use chrono::{DateTime, Utc};
use ferry_client::UpstreamClient;

use crate::cache::LastGoodLaneCache;
use crate::capacity::CapacityDeriver;
use crate::catalog::{self, Route};
use crate::dock_arc::DockArcTracker;
use crate::error::AssembleError;
use crate::fuser;
use crate::schedule::{self, ResolvedLanes};
use crate::terminal::{self, TerminalIds};
use crate::types::{
    Capacity, Fallback, FallbackMode, Lane, LaneSource, Lanes, Meta, Phase, RouteEcho, Side,
    SideCapacity, Slot, Snapshot,
};

/// Fuses the three upstream feeds into a snapshot for a requested route,
/// maintaining the process-wide dock memory, last-good caches, and
/// sticky-maximum map across requests.
pub struct StateAssembler {
    client: UpstreamClient,
    lane_cache: LastGoodLaneCache,
    dock_arc: DockArcTracker,
    capacity: CapacityDeriver,
}

impl StateAssembler {
    #[must_use]
    pub fn new(client: UpstreamClient) -> Self {
        Self {
            client,
            lane_cache: LastGoodLaneCache::new(),
            dock_arc: DockArcTracker::new(),
            capacity: CapacityDeriver::new(),
        }
    }

    /// Build a dot-state snapshot for `route_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::UnknownRoute`] if the route is not in the
    /// catalog. All other upstream trouble is absorbed into `meta` rather
    /// than propagated.
    pub async fn build_snapshot(&self, route_id: u32) -> Result<Snapshot, AssembleError> {
        let route = catalog::get_route(route_id).ok_or(AssembleError::UnknownRoute(route_id))?;
        let now = Utc::now();
        let terminals = terminal::resolve(route);
        let date_text = now.format("%Y-%m-%d").to_string();

        let (vessels_res, spaces_res, schedule_res) = tokio::join!(
            self.client.fetch_vessels(),
            self.client.fetch_terminal_spaces(),
            self.client.fetch_schedule(route.route_id, &date_text),
        );

        let vessels_stale = vessels_res.is_err();
        let terminal_space_stale = spaces_res.is_err();
        let schedule_stale = schedule_res.is_err();

        if let Err(ref e) = vessels_res {
            tracing::debug!(route_id, error = %e, "vessel locations feed degraded");
        }
        if let Err(ref e) = spaces_res {
            tracing::debug!(route_id, error = %e, "terminal sailing space feed degraded");
        }
        if let Err(ref e) = schedule_res {
            tracing::debug!(route_id, error = %e, "schedule feed degraded");
        }

        let schedule_rows = schedule_res.ok();
        let resolved = schedule::resolve_lanes(schedule_rows.as_deref(), terminals.west_id);

        if resolved.is_unusable() {
            tracing::warn!(route_id, "schedule unusable, emitting synthetic snapshot");
            return Ok(synthetic_snapshot(route, terminals, now));
        }

        let vessels = vessels_res.unwrap_or_default();
        let vessels_by_id: std::collections::HashMap<u32, &ferry_client::LiveVessel> =
            vessels.iter().map(|v| (v.vessel_id, v)).collect();

        let mut upper_lane = self.fuse_lane(route, Slot::Upper, &resolved, &vessels_by_id, terminals, now);
        let mut lower_lane = self.fuse_lane(route, Slot::Lower, &resolved, &vessels_by_id, terminals, now);

        self.dock_arc.process(route.route_id, Slot::Upper, &mut upper_lane, now);
        self.dock_arc.process(route.route_id, Slot::Lower, &mut lower_lane, now);

        let spaces = spaces_res.unwrap_or_default();

        let west_vessel_hint = [&upper_lane, &lower_lane]
            .into_iter()
            .find(|l| l.departing_terminal_id.is_some() && l.departing_terminal_id == terminals.west_id)
            .and_then(|l| l.vessel_id);
        let east_vessel_hint = [&upper_lane, &lower_lane]
            .into_iter()
            .find(|l| l.departing_terminal_id.is_some() && l.departing_terminal_id == terminals.east_id)
            .and_then(|l| l.vessel_id);

        let west_capacity = self.side_capacity(
            route.route_id,
            Side::West,
            &spaces,
            terminals.west_id,
            terminals.east_id,
            west_vessel_hint,
            now,
        );
        let east_capacity = self.side_capacity(
            route.route_id,
            Side::East,
            &spaces,
            terminals.east_id,
            terminals.west_id,
            east_vessel_hint,
            now,
        );

        let capacity_stale = [&west_capacity, &east_capacity]
            .iter()
            .any(|c| c.as_ref().is_some_and(|c| c.is_stale));

        let meta = build_meta(
            &upper_lane,
            &lower_lane,
            vessels_stale,
            terminal_space_stale,
            schedule_stale,
            capacity_stale,
        );

        Ok(Snapshot {
            route: RouteEcho::from_route(route, terminals.west_id, terminals.east_id),
            lanes: Lanes {
                upper: upper_lane,
                lower: lower_lane,
            },
            capacity: SideCapacity {
                west: west_capacity,
                east: east_capacity,
            },
            meta,
        })
    }

    fn fuse_lane(
        &self,
        route: &Route,
        slot: Slot,
        resolved: &ResolvedLanes,
        vessels_by_id: &std::collections::HashMap<u32, &ferry_client::LiveVessel>,
        terminals: TerminalIds,
        now: DateTime<Utc>,
    ) -> Lane {
        let identity = match slot {
            Slot::Upper => resolved.upper.as_ref(),
            Slot::Lower => resolved.lower.as_ref(),
        };

        match identity {
            Some(identity) => fuser::fuse(
                route.route_id,
                identity,
                vessels_by_id,
                terminals,
                route.crossing_minutes,
                &self.lane_cache,
                now,
            ),
            None => fuser::fuse_missing(route.route_id, slot, &self.lane_cache, now),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn side_capacity(
        &self,
        route_id: u32,
        side: Side,
        spaces: &[ferry_client::TerminalSpace],
        side_terminal_id: Option<u32>,
        opposite_terminal_id: Option<u32>,
        scheduled_vessel_id: Option<u32>,
        now: DateTime<Utc>,
    ) -> Option<Capacity> {
        if side_terminal_id.is_none() || opposite_terminal_id.is_none() {
            return None;
        }
        Some(self.capacity.derive(
            route_id,
            side,
            spaces,
            side_terminal_id,
            opposite_terminal_id,
            scheduled_vessel_id,
            now,
        ))
    }
}

fn build_meta(
    upper: &Lane,
    lower: &Lane,
    vessels_stale: bool,
    terminal_space_stale: bool,
    schedule_stale: bool,
    capacity_stale: bool,
) -> Meta {
    let feed_error = vessels_stale || terminal_space_stale || schedule_stale;
    let both_live = upper.source == LaneSource::Live && lower.source == LaneSource::Live;
    let fallback = Fallback {
        mode: if both_live && !feed_error {
            FallbackMode::Live
        } else {
            FallbackMode::Partial
        },
    };

    let mut reasons = Vec::new();
    if upper.source == LaneSource::Missing || lower.source == LaneSource::Missing {
        reasons.push("missing_lane");
    }
    if upper.source == LaneSource::Stale || lower.source == LaneSource::Stale {
        reasons.push("stale_lane");
    }
    if feed_error {
        reasons.push("api_error");
    }
    let reason = if reasons.is_empty() {
        "ok".to_string()
    } else {
        reasons.join("+")
    };

    Meta {
        vessels_stale,
        terminal_space_stale,
        schedule_stale,
        capacity_stale,
        upper_source: upper.source,
        lower_source: lower.source,
        fallback,
        reason,
    }
}

/// Fabricate both lanes from `now` and the route's crossing duration when
/// the schedule is completely unusable.
fn synthetic_snapshot(route: &Route, terminals: TerminalIds, now: DateTime<Utc>) -> Snapshot {
    let synthesize = |slot: Slot| -> Lane {
        let eta = now + chrono::Duration::minutes(i64::from(route.crossing_minutes));
        Lane {
            slot: slot.number(),
            vessel_id: None,
            vessel_name: "Unknown".to_string(),
            at_dock: false,
            direction: slot.nominal_direction(),
            departing_terminal_id: None,
            arriving_terminal_id: None,
            scheduled_departure: None,
            left_dock: Some(now),
            eta: Some(eta),
            phase: Phase::Unknown,
            dot_position: 0.0,
            last_updated_vessels: now,
            dock_start_time: None,
            dock_start_is_synthetic: false,
            dock_arc_fraction: None,
            is_stale: true,
            source: LaneSource::Missing,
        }
    };

    Snapshot {
        route: RouteEcho::from_route(route, terminals.west_id, terminals.east_id),
        lanes: Lanes {
            upper: synthesize(Slot::Upper),
            lower: synthesize(Slot::Lower),
        },
        capacity: SideCapacity {
            west: None,
            east: None,
        },
        meta: Meta {
            vessels_stale: true,
            terminal_space_stale: true,
            schedule_stale: true,
            capacity_stale: true,
            upper_source: LaneSource::Missing,
            lower_source: LaneSource::Missing,
            fallback: Fallback {
                mode: FallbackMode::Synthetic,
            },
            reason: "synthetic_no_live_data".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_route_is_rejected() {
        let assembler = StateAssembler::new(UpstreamClient::new("test"));
        let err = assembler.build_snapshot(999_999).await.unwrap_err();
        assert!(matches!(err, AssembleError::UnknownRoute(999_999)));
    }

    #[tokio::test]
    async fn missing_access_code_yields_synthetic_snapshot() {
        // With no access code, every upstream fetch fails at the client
        // boundary; the schedule is therefore unusable and the assembler
        // must still produce a well-formed, fully-synthetic snapshot.
        let assembler = StateAssembler::new(UpstreamClient::new(""));
        let snapshot = assembler.build_snapshot(1).await.unwrap();

        assert_eq!(snapshot.meta.fallback.mode, FallbackMode::Synthetic);
        assert_eq!(snapshot.meta.reason, "synthetic_no_live_data");
        assert_eq!(snapshot.lanes.upper.dot_position, 0.0);
        assert_eq!(snapshot.lanes.lower.slot, 2);
    }
}
