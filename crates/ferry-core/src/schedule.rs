//! Determines which vessel occupies each lane slot for the day.
//!
//! Lane identity is schedule-derived and stable across direction
//! reversals; tying lanes to the schedule instead of the currently-observed
//! direction is what eliminates flicker.

use ferry_client::ScheduleRow;

use crate::types::{LaneIdentity, Slot};

/// Result of resolving lane identities from today's schedule.
pub struct ResolvedLanes {
    pub upper: Option<LaneIdentity>,
    pub lower: Option<LaneIdentity>,
    /// True when the schedule fetch failed or yielded no usable rows.
    pub schedule_error: bool,
}

impl ResolvedLanes {
    /// True when the schedule could not identify either lane.
    #[must_use]
    pub fn is_unusable(&self) -> bool {
        self.schedule_error && self.upper.is_none() && self.lower.is_none()
    }
}

/// Resolve lane identities from a schedule fetch result.
///
/// `rows` is `None` when the schedule fetch itself failed (distinguished
/// from `Some(vec![])`, an empty-but-successful response, so both set
/// `schedule_error` but share the same downstream handling).
#[must_use]
pub fn resolve_lanes(rows: Option<&[ScheduleRow]>, west_terminal_id: Option<u32>) -> ResolvedLanes {
    let Some(rows) = rows else {
        return ResolvedLanes {
            upper: None,
            lower: None,
            schedule_error: true,
        };
    };

    let Some(west_terminal_id) = west_terminal_id else {
        return ResolvedLanes {
            upper: None,
            lower: None,
            schedule_error: true,
        };
    };

    let west_rows: Vec<&ScheduleRow> = rows
        .iter()
        .filter(|r| r.departing_terminal_id == west_terminal_id && !r.is_cancelled)
        .collect();

    let upper = west_rows
        .iter()
        .find(|r| r.vessel_position_num == 1)
        .map(|r| to_identity(r, Slot::Upper));
    let lower = west_rows
        .iter()
        .find(|r| r.vessel_position_num == 2)
        .map(|r| to_identity(r, Slot::Lower));

    let schedule_error = west_rows.is_empty();

    ResolvedLanes {
        upper,
        lower,
        schedule_error,
    }
}

fn to_identity(row: &ScheduleRow, slot: Slot) -> LaneIdentity {
    LaneIdentity {
        slot,
        vessel_id: row.vessel_id,
        vessel_name: row.vessel_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(departing: u32, pos: u8, vessel_id: u32, cancelled: bool) -> ScheduleRow {
        ScheduleRow {
            departing_terminal_id: departing,
            arriving_terminal_id: 99,
            vessel_position_num: pos,
            vessel_id,
            vessel_name: format!("Vessel {vessel_id}"),
            departing_time: None,
            is_cancelled: cancelled,
        }
    }

    #[test]
    fn picks_first_row_per_position() {
        let rows = vec![row(3, 1, 10, false), row(3, 2, 20, false), row(7, 1, 30, false)];
        let resolved = resolve_lanes(Some(&rows), Some(3));
        assert_eq!(resolved.upper.unwrap().vessel_id, 10);
        assert_eq!(resolved.lower.unwrap().vessel_id, 20);
        assert!(!resolved.schedule_error);
    }

    #[test]
    fn ignores_cancelled_rows() {
        let rows = vec![row(3, 1, 10, true)];
        let resolved = resolve_lanes(Some(&rows), Some(3));
        assert!(resolved.upper.is_none());
        assert!(resolved.schedule_error);
    }

    #[test]
    fn missing_schedule_is_an_error() {
        let resolved = resolve_lanes(None, Some(3));
        assert!(resolved.is_unusable());
    }

    #[test]
    fn no_rows_for_west_terminal_is_unusable() {
        let rows = vec![row(7, 1, 10, false)];
        let resolved = resolve_lanes(Some(&rows), Some(3));
        assert!(resolved.is_unusable());
    }

    #[test]
    fn unresolved_west_terminal_is_unusable() {
        let rows = vec![row(3, 1, 10, false)];
        let resolved = resolve_lanes(Some(&rows), None);
        assert!(resolved.is_unusable());
    }
}
