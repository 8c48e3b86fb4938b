//! Maps a route's named endpoints to upstream numeric terminal IDs.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::catalog::Route;

/// Resolved terminal IDs for a route's two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalIds {
    pub west_id: Option<u32>,
    pub east_id: Option<u32>,
}

fn terminal_table() -> &'static HashMap<&'static str, u32> {
    static TABLE: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("Seattle", 7),
            ("Bainbridge Island", 3),
            ("Edmonds", 8),
            ("Kingston", 12),
            ("Mukilteo", 13),
            ("Clinton", 1),
        ])
    })
}

/// Resolve a route's west/east terminal names to upstream IDs.
///
/// Matching is case-sensitive on the exact upstream spelling, with
/// surrounding whitespace trimmed. If either side cannot be resolved the
/// corresponding field is `None`; callers must still be able to produce a
/// degraded snapshot.
#[must_use]
pub fn resolve(route: &Route) -> TerminalIds {
    let table = terminal_table();
    TerminalIds {
        west_id: table.get(route.west_terminal_name.trim()).copied(),
        east_id: table.get(route.east_terminal_name.trim()).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_route;

    #[test]
    fn resolves_known_route() {
        let route = get_route(1).unwrap();
        let ids = resolve(route);
        assert_eq!(ids.west_id, Some(3));
        assert_eq!(ids.east_id, Some(7));
    }

    #[test]
    fn unresolvable_name_yields_none() {
        let route = Route {
            route_id: 999,
            description: "test",
            west_terminal_name: "Nowhere",
            east_terminal_name: "Seattle",
            crossing_minutes: 10,
        };
        let ids = resolve(&route);
        assert_eq!(ids.west_id, None);
        assert_eq!(ids.east_id, Some(7));
    }
}
