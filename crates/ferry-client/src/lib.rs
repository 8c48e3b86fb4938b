//! Client for the upstream ferry operations API.
//!
//! Provides the three asynchronous feeds the state assembler fuses:
//! vessel locations, terminal sailing space, and daily route schedules.

mod client;
mod date;
mod error;
mod types;

pub use client::UpstreamClient;
pub use date::parse_upstream_date;
pub use error::{ApiError, Result};
pub use types::{ArrivalSpace, DepartingSpace, LiveVessel, ScheduleRow, TerminalSpace};
