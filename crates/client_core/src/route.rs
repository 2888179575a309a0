//! Route sequence formatting.

use shared::domain::LocationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStop {
    pub id: LocationId,
    pub name: String,
}

impl RouteStop {
    pub fn labelled(&self) -> String {
        format!("{} ({})", self.id, self.name)
    }
}

/// Placeholder shown for a location id missing from the current snapshot.
pub fn location_placeholder(id: LocationId) -> String {
    format!("Location #{id}")
}

/// Collapses consecutive repeats of the same location and resolves names.
///
/// Only adjacent duplicates are dropped: `[3, 3, 5, 3]` becomes `[3, 5, 3]`.
pub fn format_route<F>(ids: &[LocationId], resolve_name: F) -> Vec<RouteStop>
where
    F: Fn(LocationId) -> Option<String>,
{
    let mut stops: Vec<RouteStop> = Vec::with_capacity(ids.len());
    for &id in ids {
        if stops.last().is_some_and(|last| last.id == id) {
            continue;
        }
        let name = resolve_name(id).unwrap_or_else(|| location_placeholder(id));
        stops.push(RouteStop { id, name });
    }
    stops
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePresentation {
    NoRoute,
    AlreadyAtDestination(RouteStop),
    Path(Vec<RouteStop>),
}

impl RoutePresentation {
    pub fn from_stops(mut stops: Vec<RouteStop>) -> Self {
        match stops.len() {
            0 => Self::NoRoute,
            1 => Self::AlreadyAtDestination(stops.remove(0)),
            _ => Self::Path(stops),
        }
    }

    /// Operator-facing sentence for a driver's delivery route.
    pub fn describe(&self) -> String {
        match self {
            Self::NoRoute => "No route available for this driver".to_string(),
            Self::AlreadyAtDestination(stop) => {
                format!("Driver is already at the destination: {}", stop.labelled())
            }
            Self::Path(stops) => format!("Delivery Route: {}", join_labelled(stops)),
        }
    }
}

/// `1 → 5 → 2`
pub fn join_ids(stops: &[RouteStop]) -> String {
    stops
        .iter()
        .map(|stop| stop.id.to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// `1 (Depot) → 5 (Mall)`
pub fn join_labelled(stops: &[RouteStop]) -> String {
    stops
        .iter()
        .map(RouteStop::labelled)
        .collect::<Vec<_>>()
        .join(" → ")
}

#[cfg(test)]
#[path = "tests/route_tests.rs"]
mod tests;
