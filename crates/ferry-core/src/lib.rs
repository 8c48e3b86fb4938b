//! Domain logic for fusing the WSDOT ferry feeds into a per-route dot-state
//! snapshot: schedule-derived lane identity, live telemetry fusion, dock-arc
//! memory, and drive-on capacity derivation.

mod assembler;
mod cache;
mod capacity;
mod catalog;
mod dock_arc;
mod error;
mod fuser;
mod schedule;
mod terminal;
mod types;

pub use assembler::StateAssembler;
pub use catalog::{get_route, list_routes, Route};
pub use error::AssembleError;
pub use terminal::{resolve as resolve_terminals, TerminalIds};
pub use types::{
    Capacity, Direction, Fallback, FallbackMode, Lane, Lanes, LaneSource, Meta, Phase, RouteEcho,
    Side, SideCapacity, Slot, Snapshot,
};
