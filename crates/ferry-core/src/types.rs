//! Output and intermediate data model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Route;

/// A display slot. Slot 1 is "upper", slot 2 is "lower".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Upper,
    Lower,
}

impl Slot {
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Slot::Upper => 1,
            Slot::Lower => 2,
        }
    }

    /// The slot's nominal direction, used as a fallback when live
    /// telemetry doesn't match the route's orientation.
    #[must_use]
    pub fn nominal_direction(self) -> Direction {
        match self {
            Slot::Upper => Direction::WestToEast,
            Slot::Lower => Direction::EastToWest,
        }
    }
}

/// Which side of the route a terminal/side-scoped value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    West,
    East,
}

/// Lane identity produced only from schedule data.
#[derive(Debug, Clone)]
pub struct LaneIdentity {
    pub slot: Slot,
    pub vessel_id: u32,
    pub vessel_name: String,
}

/// Direction of travel for a lane. Not a pure function of live telemetry:
/// it is either matched against the route's orientation, or falls back to
/// the slot's nominal direction when neither orientation matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    WestToEast,
    EastToWest,
    Unknown,
}

/// Phase of a lane's vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    AtDock,
    Underway,
    Unknown,
}

/// Where a lane's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneSource {
    Live,
    Stale,
    Missing,
}

/// A fully assembled lane, ready to hand to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub slot: u8,
    pub vessel_id: Option<u32>,
    pub vessel_name: String,
    pub at_dock: bool,
    pub direction: Direction,
    pub departing_terminal_id: Option<u32>,
    pub arriving_terminal_id: Option<u32>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub left_dock: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub phase: Phase,
    pub dot_position: f64,
    pub last_updated_vessels: DateTime<Utc>,
    pub dock_start_time: Option<DateTime<Utc>>,
    pub dock_start_is_synthetic: bool,
    pub dock_arc_fraction: Option<f64>,
    pub is_stale: bool,
    #[serde(skip)]
    pub source: LaneSource,
}

/// Per-side drive-on capacity for the next departing sailing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    pub terminal_id: Option<u32>,
    pub vessel_id: Option<u32>,
    pub vessel_name: Option<String>,
    pub max_auto: Option<i64>,
    pub avail_auto: Option<i64>,
    pub last_updated: DateTime<Utc>,
    pub is_stale: bool,
}

/// Degradation summary attached to every snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub vessels_stale: bool,
    pub terminal_space_stale: bool,
    pub schedule_stale: bool,
    pub capacity_stale: bool,
    pub upper_source: LaneSource,
    pub lower_source: LaneSource,
    pub fallback: Fallback,
    pub reason: String,
}

/// Overall degradation mode of a snapshot, nested under `meta.fallback.mode`.
#[derive(Debug, Clone, Serialize)]
pub struct Fallback {
    pub mode: FallbackMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    Live,
    Partial,
    Synthetic,
}

/// Route attributes echoed back on a snapshot, resolved and display-cased.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEcho {
    pub route_id: u32,
    pub description: String,
    pub west_id: Option<u32>,
    pub east_id: Option<u32>,
    pub west_label: String,
    pub east_label: String,
}

impl RouteEcho {
    pub(crate) fn from_route(route: &Route, west_id: Option<u32>, east_id: Option<u32>) -> Self {
        Self {
            route_id: route.route_id,
            description: route.description.to_string(),
            west_id,
            east_id,
            west_label: route.west_terminal_name.to_uppercase(),
            east_label: route.east_terminal_name.to_uppercase(),
        }
    }
}

/// The assembled dot-state snapshot for a route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub route: RouteEcho,
    pub lanes: Lanes,
    pub capacity: SideCapacity,
    pub meta: Meta,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lanes {
    pub upper: Lane,
    pub lower: Lane,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideCapacity {
    pub west: Option<Capacity>,
    pub east: Option<Capacity>,
}
