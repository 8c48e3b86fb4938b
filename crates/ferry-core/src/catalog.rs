//! The closed set of supported routes and their static attributes.

use serde::Serialize;

/// A supported ferry route. Static; never mutated after start-up.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub route_id: u32,
    pub description: &'static str,
    pub west_terminal_name: &'static str,
    pub east_terminal_name: &'static str,
    /// Nominal one-way crossing duration.
    pub crossing_minutes: u32,
}

/// The whitelist of routes this service serves.
///
/// In the real system this mirrors WSF's own route catalog; kept as a
/// fixed table here: process-wide state initialised at start-up and
/// never mutated.
static ROUTES: &[Route] = &[
    Route {
        route_id: 1,
        description: "Seattle / Bainbridge Island",
        west_terminal_name: "Bainbridge Island",
        east_terminal_name: "Seattle",
        crossing_minutes: 35,
    },
    Route {
        route_id: 5,
        description: "Edmonds / Kingston",
        west_terminal_name: "Kingston",
        east_terminal_name: "Edmonds",
        crossing_minutes: 30,
    },
    Route {
        route_id: 9,
        description: "Mukilteo / Clinton",
        west_terminal_name: "Clinton",
        east_terminal_name: "Mukilteo",
        crossing_minutes: 20,
    },
];

/// Return the full ordered list of supported routes.
#[must_use]
pub fn list_routes() -> &'static [Route] {
    ROUTES
}

/// Look up a route by ID. Absence is a terminal "unknown route" condition
/// to the caller.
#[must_use]
pub fn get_route(route_id: u32) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.route_id == route_id)
}
