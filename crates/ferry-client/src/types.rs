//! Upstream DTOs and their normalised counterparts.
//!
//! Raw structs mirror the upstream's exact field names so
//! deserialization needs no renaming tables; normalised structs use the
//! service's own vocabulary and absolute timestamps.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::date::parse_upstream_date;

fn deserialize_upstream_date<'de, D>(d: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.and_then(|s| parse_upstream_date(&s)))
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VesselLocationRaw {
    #[serde(rename = "VesselID")]
    pub vessel_id: u32,
    #[serde(rename = "VesselName")]
    pub vessel_name: String,
    #[serde(rename = "DepartingTerminalID")]
    pub departing_terminal_id: Option<u32>,
    #[serde(rename = "ArrivingTerminalID")]
    pub arriving_terminal_id: Option<u32>,
    #[serde(rename = "AtDock")]
    pub at_dock: bool,
    #[serde(
        rename = "LeftDock",
        default,
        deserialize_with = "deserialize_upstream_date"
    )]
    pub left_dock: Option<DateTime<Utc>>,
    #[serde(rename = "Eta", default, deserialize_with = "deserialize_upstream_date")]
    pub eta: Option<DateTime<Utc>>,
    #[serde(
        rename = "ScheduledDeparture",
        default,
        deserialize_with = "deserialize_upstream_date"
    )]
    pub scheduled_departure: Option<DateTime<Utc>>,
    #[serde(
        rename = "TimeStamp",
        default,
        deserialize_with = "deserialize_upstream_date"
    )]
    pub time_stamp: Option<DateTime<Utc>>,
}

/// A vessel on the water, normalised from the vessel-locations feed.
#[derive(Debug, Clone)]
pub struct LiveVessel {
    pub vessel_id: u32,
    pub vessel_name: String,
    pub departing_terminal_id: Option<u32>,
    pub arriving_terminal_id: Option<u32>,
    pub at_dock: bool,
    pub left_dock: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub time_stamp: Option<DateTime<Utc>>,
}

impl From<VesselLocationRaw> for LiveVessel {
    fn from(raw: VesselLocationRaw) -> Self {
        Self {
            vessel_id: raw.vessel_id,
            vessel_name: raw.vessel_name,
            departing_terminal_id: raw.departing_terminal_id,
            arriving_terminal_id: raw.arriving_terminal_id,
            at_dock: raw.at_dock,
            left_dock: raw.left_dock,
            eta: raw.eta,
            scheduled_departure: raw.scheduled_departure,
            time_stamp: raw.time_stamp,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScheduleResponseRaw {
    #[serde(rename = "TerminalCombos")]
    pub terminal_combos: Vec<TerminalComboRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TerminalComboRaw {
    #[serde(rename = "DepartingTerminalID")]
    pub departing_terminal_id: u32,
    #[serde(rename = "ArrivingTerminalID")]
    pub arriving_terminal_id: u32,
    #[serde(rename = "Times")]
    pub times: Vec<ScheduleTimeRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScheduleTimeRaw {
    #[serde(rename = "VesselPositionNum")]
    pub vessel_position_num: u8,
    #[serde(rename = "VesselID")]
    pub vessel_id: u32,
    #[serde(rename = "VesselName")]
    pub vessel_name: String,
    #[serde(
        rename = "DepartingTime",
        default,
        deserialize_with = "deserialize_upstream_date"
    )]
    pub departing_time: Option<DateTime<Utc>>,
    #[serde(rename = "IsCancelled", default)]
    pub is_cancelled: bool,
}

/// A single scheduled departure row, flattened from `TerminalCombos`.
#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub departing_terminal_id: u32,
    pub arriving_terminal_id: u32,
    pub vessel_position_num: u8,
    pub vessel_id: u32,
    pub vessel_name: String,
    pub departing_time: Option<DateTime<Utc>>,
    pub is_cancelled: bool,
}

pub(crate) fn flatten_schedule(raw: ScheduleResponseRaw) -> Vec<ScheduleRow> {
    raw.terminal_combos
        .into_iter()
        .flat_map(|combo| {
            combo.times.into_iter().map(move |t| ScheduleRow {
                departing_terminal_id: combo.departing_terminal_id,
                arriving_terminal_id: combo.arriving_terminal_id,
                vessel_position_num: t.vessel_position_num,
                vessel_id: t.vessel_id,
                vessel_name: t.vessel_name,
                departing_time: t.departing_time,
                is_cancelled: t.is_cancelled,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TerminalSpaceRaw {
    #[serde(rename = "TerminalID")]
    pub terminal_id: u32,
    #[serde(rename = "DepartingSpaces", default)]
    pub departing_spaces: Vec<DepartingSpaceRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DepartingSpaceRaw {
    #[serde(
        rename = "Departure",
        default,
        deserialize_with = "deserialize_upstream_date"
    )]
    pub departure: Option<DateTime<Utc>>,
    #[serde(rename = "VesselID")]
    pub vessel_id: u32,
    #[serde(rename = "VesselName")]
    pub vessel_name: String,
    #[serde(rename = "SpaceForArrivalTerminals", default)]
    pub space_for_arrival_terminals: Vec<ArrivalSpaceRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArrivalSpaceRaw {
    #[serde(rename = "TerminalID")]
    pub terminal_id: u32,
    #[serde(rename = "DriveUpSpaceCount", default)]
    pub drive_up_space_count: Option<i64>,
    #[serde(rename = "MaxSpaceCount", default)]
    pub max_space_count: Option<i64>,
}

/// Per-terminal drive-on availability, kept structurally close to the
/// upstream shape; the Capacity Deriver (`ferry-core`) is responsible for
/// enumerating and filtering the nested arrays.
#[derive(Debug, Clone)]
pub struct TerminalSpace {
    pub terminal_id: u32,
    pub departing_spaces: Vec<DepartingSpace>,
}

#[derive(Debug, Clone)]
pub struct DepartingSpace {
    pub departure: Option<DateTime<Utc>>,
    pub vessel_id: u32,
    pub vessel_name: String,
    pub space_for_arrival_terminals: Vec<ArrivalSpace>,
}

#[derive(Debug, Clone)]
pub struct ArrivalSpace {
    pub arrival_terminal_id: u32,
    pub drive_up_space_count: Option<i64>,
    pub max_space_count: Option<i64>,
}

impl From<TerminalSpaceRaw> for TerminalSpace {
    fn from(raw: TerminalSpaceRaw) -> Self {
        Self {
            terminal_id: raw.terminal_id,
            departing_spaces: raw
                .departing_spaces
                .into_iter()
                .map(DepartingSpace::from)
                .collect(),
        }
    }
}

impl From<DepartingSpaceRaw> for DepartingSpace {
    fn from(raw: DepartingSpaceRaw) -> Self {
        Self {
            departure: raw.departure,
            vessel_id: raw.vessel_id,
            vessel_name: raw.vessel_name,
            space_for_arrival_terminals: raw
                .space_for_arrival_terminals
                .into_iter()
                .map(|a| ArrivalSpace {
                    arrival_terminal_id: a.terminal_id,
                    drive_up_space_count: a.drive_up_space_count,
                    max_space_count: a.max_space_count,
                })
                .collect(),
        }
    }
}
