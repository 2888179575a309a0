//! Fragment trees and the region mount lifecycle.
//!
//! Rendering is pure: `render_*` functions turn snapshots into immutable
//! [`Fragment`] lists. A [`Region`] owns the currently mounted tree together
//! with the action bound to every control inside it. Mounting replaces both as
//! one unit and bumps the region generation, so a [`ControlHandle`] taken from
//! an earlier tree can never fire against the new one.

use std::collections::HashMap;

use shared::domain::{Driver, DriverId, Location, LocationId, OrderId, OrderStatus};
use tracing::debug;

use crate::{
    join::DerivedOrderView,
    route::{join_labelled, location_placeholder, RoutePresentation, RouteStop},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Locations,
    Orders,
    Drivers,
    RouteResult,
}

impl RegionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Locations => "locations",
            Self::Orders => "orders",
            Self::Drivers => "drivers",
            Self::RouteResult => "route_result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    CompleteOrder,
    ShowOrderRoute,
    RetryAssign,
    ToggleDriverRoute,
}

/// An interactive element. `data_id` is the related entity's identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub kind: ControlKind,
    pub label: String,
    pub data_id: i64,
}

impl Control {
    fn new(kind: ControlKind, label: &str, data_id: i64) -> Self {
        Self {
            kind,
            label: label.to_string(),
            data_id,
        }
    }

    fn bind(&self) -> Action {
        match self.kind {
            ControlKind::CompleteOrder => Action::CompleteOrder(OrderId(self.data_id)),
            ControlKind::RetryAssign => Action::RetryAssign(OrderId(self.data_id)),
            ControlKind::ShowOrderRoute => Action::ShowDriverRoute(DriverId(self.data_id)),
            ControlKind::ToggleDriverRoute => Action::ToggleDriverRoute(DriverId(self.data_id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Empty-state message for a collection with no records.
    Empty(String),
    Heading(String),
    Text(String),
    Status { label: String, class: String },
    Error(String),
    Control(Control),
    Item(Vec<Fragment>),
    /// Collapsible section; hidden sections expose no controls.
    Disclosure {
        visible: bool,
        children: Vec<Fragment>,
    },
}

/// What a bound control does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CompleteOrder(OrderId),
    RetryAssign(OrderId),
    ShowDriverRoute(DriverId),
    ToggleDriverRoute(DriverId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlHandle {
    pub region: RegionKind,
    pub generation: u64,
    pub slot: usize,
}

/// Pre-order walk over the reachable controls of a tree.
pub fn visit_controls<'a>(fragments: &'a [Fragment], out: &mut Vec<&'a Control>) {
    for fragment in fragments {
        match fragment {
            Fragment::Control(control) => out.push(control),
            Fragment::Item(children) => visit_controls(children, out),
            Fragment::Disclosure { visible, children } if *visible => {
                visit_controls(children, out)
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    kind: RegionKind,
    generation: u64,
    tree: Vec<Fragment>,
    bindings: Vec<Action>,
}

impl Region {
    pub fn new(kind: RegionKind) -> Self {
        Self {
            kind,
            generation: 0,
            tree: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_mounted(&self) -> bool {
        self.generation > 0
    }

    pub fn tree(&self) -> &[Fragment] {
        &self.tree
    }

    /// Replaces the whole tree and its bindings, then binds a fresh action to
    /// every control found in the new tree.
    pub fn mount(&mut self, tree: Vec<Fragment>) {
        let mut controls = Vec::new();
        visit_controls(&tree, &mut controls);
        let bindings = controls.into_iter().map(Control::bind).collect::<Vec<_>>();

        self.generation += 1;
        debug!(
            region = self.kind.label(),
            generation = self.generation,
            controls = bindings.len(),
            "mounted region"
        );
        self.tree = tree;
        self.bindings = bindings;
    }

    pub fn handle(&self, slot: usize) -> Option<ControlHandle> {
        (slot < self.bindings.len()).then_some(ControlHandle {
            region: self.kind,
            generation: self.generation,
            slot,
        })
    }

    /// Handles for every bound control, in tree order.
    pub fn controls(&self) -> Vec<(ControlHandle, &Control)> {
        let mut controls = Vec::new();
        visit_controls(&self.tree, &mut controls);
        controls
            .into_iter()
            .enumerate()
            .filter_map(|(slot, control)| self.handle(slot).map(|handle| (handle, control)))
            .collect()
    }

    /// Resolves a handle against the mounted tree. Handles minted for another
    /// region or an earlier mount resolve to nothing.
    pub fn dispatch(&self, handle: ControlHandle) -> Option<Action> {
        if handle.region != self.kind || handle.generation != self.generation {
            debug!(
                region = self.kind.label(),
                stale_generation = handle.generation,
                generation = self.generation,
                "ignoring activation of unmounted control"
            );
            return None;
        }
        self.bindings.get(handle.slot).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: Option<LocationId>,
    pub label: String,
}

impl SelectOption {
    fn placeholder(label: &str) -> Self {
        Self {
            value: None,
            label: label.to_string(),
        }
    }
}

/// Option lists of the four location pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionLists {
    pub restaurant: Vec<SelectOption>,
    pub customer: Vec<SelectOption>,
    pub route_start: Vec<SelectOption>,
    pub route_end: Vec<SelectOption>,
}

impl Default for SelectionLists {
    fn default() -> Self {
        render_selection_lists(&[])
    }
}

pub fn render_selection_lists(locations: &[Location]) -> SelectionLists {
    let options = locations
        .iter()
        .map(|location| SelectOption {
            value: Some(location.id),
            label: format!("{} (ID: {})", location.name, location.id),
        })
        .collect::<Vec<_>>();

    let with_placeholder = |label: &str| {
        let mut list = Vec::with_capacity(options.len() + 1);
        list.push(SelectOption::placeholder(label));
        list.extend(options.iter().cloned());
        list
    };

    SelectionLists {
        restaurant: with_placeholder("Select Restaurant"),
        customer: with_placeholder("Select Customer Location"),
        route_start: with_placeholder("Start Location"),
        route_end: with_placeholder("End Location"),
    }
}

/// Name lookup over the latest location snapshot.
pub struct LocationDirectory<'a> {
    names: HashMap<LocationId, &'a str>,
}

impl<'a> LocationDirectory<'a> {
    pub fn new(locations: &'a [Location]) -> Self {
        Self {
            names: locations
                .iter()
                .map(|location| (location.id, location.name.as_str()))
                .collect(),
        }
    }

    pub fn name(&self, id: LocationId) -> Option<String> {
        self.names.get(&id).map(|name| name.to_string())
    }

    /// `Depot (ID: 1)`, or the placeholder when the id is unknown.
    pub fn describe(&self, id: LocationId) -> String {
        match self.names.get(&id) {
            Some(name) => format!("{name} (ID: {id})"),
            None => location_placeholder(id),
        }
    }
}

pub fn render_locations(locations: &[Location]) -> Vec<Fragment> {
    if locations.is_empty() {
        return vec![Fragment::Empty("No locations added yet".to_string())];
    }

    locations
        .iter()
        .map(|location| {
            Fragment::Item(vec![
                Fragment::Heading(format!("{} (ID: {})", location.name, location.id)),
                Fragment::Text(format!("Coordinates: ({}, {})", location.x, location.y)),
            ])
        })
        .collect()
}

/// Action controls for one order. "Driver" is the joined driver, so an
/// assignment to a driver missing from the snapshot counts as unassigned.
///
/// | driver | status      | controls                   |
/// |--------|-------------|----------------------------|
/// | yes    | ≠ Delivered | Mark Delivered, Show Route |
/// | yes    | Delivered   | none                       |
/// | no     | Pending     | Try Again                  |
/// | no     | other       | none                       |
pub fn order_controls(view: &DerivedOrderView) -> Vec<Control> {
    let order = &view.order;
    match (view.driver, &order.status) {
        (Some(_), OrderStatus::Delivered) => Vec::new(),
        (Some(driver), _) => vec![
            Control::new(ControlKind::CompleteOrder, "Mark Delivered", order.id.0),
            Control::new(ControlKind::ShowOrderRoute, "Show Route", driver.id.0),
        ],
        (None, OrderStatus::Pending) => vec![Control::new(
            ControlKind::RetryAssign,
            "Try Again",
            order.id.0,
        )],
        (None, _) => Vec::new(),
    }
}

pub fn render_orders(
    views: &[DerivedOrderView],
    locations: &LocationDirectory<'_>,
) -> Vec<Fragment> {
    if views.is_empty() {
        return vec![Fragment::Empty("No orders placed yet".to_string())];
    }

    views
        .iter()
        .map(|view| {
            let order = &view.order;
            let mut children = vec![
                Fragment::Heading(format!("Order #{}", order.id)),
                Fragment::Text(format!(
                    "Restaurant: {}, Customer: {}",
                    locations.describe(order.restaurant_id),
                    locations.describe(order.customer_location_id)
                )),
                Fragment::Status {
                    label: order.status.label().to_string(),
                    class: order.status.css_class(),
                },
            ];

            match (order.assigned_driver_id, view.driver) {
                (Some(_), Some(driver)) => children.push(Fragment::Text(format!(
                    "Assigned to: Driver #{} (at {}, speed: {})",
                    driver.id,
                    locations.describe(driver.current_location),
                    driver.speed
                ))),
                (Some(driver_id), None) => children.push(Fragment::Text(format!(
                    "Assigned to: Driver #{driver_id} (not in current snapshot)"
                ))),
                (None, _) => {}
            }

            children.extend(order_controls(view).into_iter().map(Fragment::Control));
            Fragment::Item(children)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverRouteEntry {
    pub presentation: RoutePresentation,
    pub visible: bool,
}

/// Per-driver route disclosure state. Local to the console and discarded
/// whenever the driver collection is reloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverRouteToggles {
    entries: HashMap<DriverId, DriverRouteEntry>,
}

impl DriverRouteToggles {
    pub fn get(&self, driver_id: DriverId) -> Option<&DriverRouteEntry> {
        self.entries.get(&driver_id)
    }

    pub fn insert_fetched(&mut self, driver_id: DriverId, presentation: RoutePresentation) {
        self.entries.insert(
            driver_id,
            DriverRouteEntry {
                presentation,
                visible: true,
            },
        );
    }

    /// Flips visibility of an already fetched route. Returns the new
    /// visibility, or `None` when nothing was fetched yet.
    pub fn toggle(&mut self, driver_id: DriverId) -> Option<bool> {
        let entry = self.entries.get_mut(&driver_id)?;
        entry.visible = !entry.visible;
        Some(entry.visible)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn inline_route(presentation: &RoutePresentation) -> Fragment {
    match presentation {
        RoutePresentation::NoRoute => Fragment::Text("No route available".to_string()),
        RoutePresentation::AlreadyAtDestination(stop) => {
            Fragment::Text(format!("Already at destination: {}", stop.labelled()))
        }
        RoutePresentation::Path(stops) => {
            Fragment::Text(format!("Optimal Route: {}", join_labelled(stops)))
        }
    }
}

pub fn render_drivers(
    drivers: &[Driver],
    locations: &LocationDirectory<'_>,
    toggles: &DriverRouteToggles,
) -> Vec<Fragment> {
    if drivers.is_empty() {
        return vec![Fragment::Empty("No drivers added yet".to_string())];
    }

    drivers
        .iter()
        .map(|driver| {
            let orders = if driver.assigned_orders.is_empty() {
                "None".to_string()
            } else {
                driver
                    .assigned_orders
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };

            let mut children = vec![
                Fragment::Heading(format!("Driver #{}", driver.id)),
                Fragment::Text(format!(
                    "Location: {}, Speed: {}",
                    locations.describe(driver.current_location),
                    driver.speed
                )),
                Fragment::Text(format!("Orders: {orders}")),
            ];

            if !driver.assigned_orders.is_empty() {
                let entry = toggles.get(driver.id);
                let visible = entry.is_some_and(|entry| entry.visible);
                let label = if visible { "Hide Route" } else { "Show Route" };
                children.push(Fragment::Control(Control::new(
                    ControlKind::ToggleDriverRoute,
                    label,
                    driver.id.0,
                )));
                children.push(Fragment::Disclosure {
                    visible,
                    children: entry
                        .map(|entry| vec![inline_route(&entry.presentation)])
                        .unwrap_or_default(),
                });
            }

            Fragment::Item(children)
        })
        .collect()
}

/// Result of a point-to-point route query.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteQueryOutcome {
    Found { stops: Vec<RouteStop>, distance: f64 },
    NotFound,
    Failed(String),
}

pub fn render_route_result(outcome: &RouteQueryOutcome) -> Vec<Fragment> {
    match outcome {
        RouteQueryOutcome::Found { stops, distance } => vec![
            Fragment::Heading("Route Found".to_string()),
            Fragment::Text(format!("Path: {}", join_labelled(stops))),
            Fragment::Text(format!("Total Distance: {distance:.2} units")),
        ],
        RouteQueryOutcome::NotFound => vec![Fragment::Error(
            "No path found between these locations.".to_string(),
        )],
        RouteQueryOutcome::Failed(message) => vec![Fragment::Error(format!("Error: {message}"))],
    }
}

/// Everything the console displays, as last mounted.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub locations: Region,
    pub orders: Region,
    pub drivers: Region,
    pub route_result: Region,
    pub selections: SelectionLists,
    pub driver_routes: DriverRouteToggles,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            locations: Region::new(RegionKind::Locations),
            orders: Region::new(RegionKind::Orders),
            drivers: Region::new(RegionKind::Drivers),
            route_result: Region::new(RegionKind::RouteResult),
            selections: SelectionLists::default(),
            driver_routes: DriverRouteToggles::default(),
        }
    }
}

impl ViewState {
    pub fn region(&self, kind: RegionKind) -> &Region {
        match kind {
            RegionKind::Locations => &self.locations,
            RegionKind::Orders => &self.orders,
            RegionKind::Drivers => &self.drivers,
            RegionKind::RouteResult => &self.route_result,
        }
    }

    pub fn dispatch(&self, handle: ControlHandle) -> Option<Action> {
        self.region(handle.region).dispatch(handle)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
