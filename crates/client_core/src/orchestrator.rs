//! Operator intent sequencing.
//!
//! Every mutating action runs validate → call → confirm → reload. Reloads are
//! issued only after the mutating call resolved, and only for the collections
//! that call can affect. A failed call leaves every snapshot untouched.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use shared::{
    domain::{Driver, DriverId, Location, LocationId, Order, OrderId, OrderStatus},
    error::ApiError,
    protocol::PlaceOrderResponse,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    forms::{DriverForm, FormError, LocationForm, OrderForm, RouteForm},
    join::join_orders_with_drivers,
    route::{format_route, join_ids, RoutePresentation},
    view::{
        render_drivers, render_locations, render_orders, render_route_result,
        render_selection_lists, Action, ControlHandle, LocationDirectory, RouteQueryOutcome,
        ViewState,
    },
    DeliveryApi,
};

const DEFAULT_MAX_ASSIGN_ATTEMPTS: u32 = 5;
const DEFAULT_ASSIGN_RETRY_COOLDOWN: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// Human-readable outcome of an operator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == NoticeSeverity::Error
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    RetryRefused(String),
}

/// Collections to re-fetch after an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSet {
    pub locations: bool,
    pub orders: bool,
    pub drivers: bool,
}

impl ReloadSet {
    pub const NONE: Self = Self {
        locations: false,
        orders: false,
        drivers: false,
    };
    pub const ALL: Self = Self {
        locations: true,
        orders: true,
        drivers: true,
    };
    pub const LOCATIONS: Self = Self {
        locations: true,
        ..Self::NONE
    };
    pub const DRIVERS: Self = Self {
        drivers: true,
        ..Self::NONE
    };
    pub const ORDERS_AND_DRIVERS: Self = Self {
        orders: true,
        drivers: true,
        ..Self::NONE
    };
}

/// Bound on operator-triggered "Try Again" assignment attempts per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed per order; `0` disables the bound.
    pub max_attempts: u32,
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ASSIGN_ATTEMPTS,
            cooldown: DEFAULT_ASSIGN_RETRY_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryAttempts {
    count: u32,
    last: Instant,
}

/// Last fetched copy of each collection.
#[derive(Debug, Clone, Default)]
pub struct Snapshots {
    pub locations: Vec<Location>,
    pub orders: Vec<Order>,
    pub drivers: Vec<Driver>,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub snapshots: Snapshots,
    pub view: ViewState,
    retries: HashMap<OrderId, RetryAttempts>,
}

#[derive(Debug, Clone)]
pub enum Intent {
    LoadAll,
    AddLocation(LocationForm),
    PlaceOrder(OrderForm),
    AddDriver(DriverForm),
    FindRoute(RouteForm),
    Activate(ControlHandle),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadAll => "load_all",
            Self::AddLocation(_) => "add_location",
            Self::PlaceOrder(_) => "place_order",
            Self::AddDriver(_) => "add_driver",
            Self::FindRoute(_) => "find_route",
            Self::Activate(_) => "activate",
        }
    }
}

pub struct Orchestrator<A: DeliveryApi> {
    api: A,
    state: AppState,
    retry_policy: RetryPolicy,
}

impl<A: DeliveryApi> Orchestrator<A> {
    pub fn new(api: A, retry_policy: RetryPolicy) -> Self {
        Self {
            api,
            state: AppState::default(),
            retry_policy,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.state.view
    }

    /// Runs one intent to completion. Returns the notice to show the operator,
    /// if the intent produces one.
    pub async fn perform(&mut self, intent: Intent) -> Option<Notice> {
        let name = intent.name();
        let result = match intent {
            Intent::LoadAll => {
                self.load_all().await;
                Ok(None)
            }
            Intent::AddLocation(form) => self.add_location(&form).await.map(Some),
            Intent::PlaceOrder(form) => self.place_order(&form).await.map(Some),
            Intent::AddDriver(form) => self.add_driver(&form).await.map(Some),
            Intent::FindRoute(form) => self.find_route(&form).await.map(Some),
            Intent::Activate(handle) => self.activate(handle).await,
        };

        match result {
            Ok(notice) => {
                info!(intent = name, "operator action completed");
                notice
            }
            Err(err) => {
                warn!(intent = name, "operator action failed: {err}");
                Some(Notice::error(format!("Error: {err}")))
            }
        }
    }

    pub async fn load_all(&mut self) {
        self.reload(ReloadSet::ALL).await;
    }

    /// Re-fetches the requested collections. Drivers are fetched before
    /// orders so the order join sees the freshest driver snapshot.
    pub async fn reload(&mut self, set: ReloadSet) {
        if set.locations {
            self.reload_locations().await;
        }
        if set.drivers {
            self.reload_drivers().await;
        }
        if set.orders {
            self.reload_orders().await;
        }
    }

    async fn activate(&mut self, handle: ControlHandle) -> Result<Option<Notice>, ActionError> {
        let Some(action) = self.state.view.dispatch(handle) else {
            return Ok(None);
        };
        debug!(?action, "control activated");

        match action {
            Action::CompleteOrder(order_id) => self.complete_order(order_id).await.map(Some),
            Action::RetryAssign(order_id) => self.retry_assignment(order_id).await.map(Some),
            Action::ShowDriverRoute(driver_id) => self.show_driver_route(driver_id).await.map(Some),
            Action::ToggleDriverRoute(driver_id) => self.toggle_driver_route(driver_id).await,
        }
    }

    pub async fn add_location(&mut self, form: &LocationForm) -> Result<Notice, ActionError> {
        let request = form.validate()?;
        self.api.create_location(&request).await?;
        let notice = Notice::info(format!(
            "Location #{} ({}) added successfully!",
            request.id, request.name
        ));
        self.reload(ReloadSet::LOCATIONS).await;
        Ok(notice)
    }

    pub async fn place_order(&mut self, form: &OrderForm) -> Result<Notice, ActionError> {
        let request = form.validate()?;
        let response = self.api.place_order(&request).await?;
        let notice = self.order_placed_notice(&response);
        self.reload(ReloadSet::ORDERS_AND_DRIVERS).await;
        Ok(notice)
    }

    fn order_placed_notice(&self, response: &PlaceOrderResponse) -> Notice {
        let mut lines = vec![format!(
            "Order #{} placed successfully!",
            response.order_id
        )];

        match response.driver_id {
            Some(driver_id) => {
                lines.push(format!("Assigned to Driver #{driver_id}"));
                if let Some(route) = response.route.as_deref().filter(|route| !route.is_empty()) {
                    let directory = LocationDirectory::new(&self.state.snapshots.locations);
                    let stops = format_route(route, |id| directory.name(id));
                    lines.push(format!("Delivery Route: {}", join_ids(&stops)));
                }
            }
            None => {
                if let Some(message) = response.message.as_deref() {
                    lines.push(message.to_string());
                }
                lines.push("Order marked as pending. Try again later.".to_string());
            }
        }

        Notice::info(lines.join("\n"))
    }

    pub async fn add_driver(&mut self, form: &DriverForm) -> Result<Notice, ActionError> {
        let request = form.validate()?;
        let response = self.api.create_driver(&request).await?;
        // A new driver is new capacity; pending orders get a fresh retry budget.
        self.state.retries.clear();
        let notice = Notice::info(format!(
            "Driver #{} added successfully!",
            response.driver_id
        ));
        self.reload(ReloadSet::DRIVERS).await;
        Ok(notice)
    }

    pub async fn complete_order(&mut self, order_id: OrderId) -> Result<Notice, ActionError> {
        self.api.complete_order(order_id).await?;
        let notice = Notice::info(format!("Order #{order_id} marked as delivered!"));
        self.reload(ReloadSet::ORDERS_AND_DRIVERS).await;
        Ok(notice)
    }

    pub async fn retry_assignment(&mut self, order_id: OrderId) -> Result<Notice, ActionError> {
        self.claim_retry_attempt(order_id)?;
        let response = self.api.assign_order(order_id).await?;
        let notice = match response.driver_id {
            Some(driver_id) => {
                self.state.retries.remove(&order_id);
                Notice::info(format!("Order #{order_id} assigned to Driver #{driver_id}"))
            }
            None => Notice::info(format!(
                "Still no suitable driver available for Order #{order_id}"
            )),
        };
        self.reload(ReloadSet::ORDERS_AND_DRIVERS).await;
        Ok(notice)
    }

    fn claim_retry_attempt(&mut self, order_id: OrderId) -> Result<(), ActionError> {
        let policy = self.retry_policy;
        let now = Instant::now();

        if let Some(attempts) = self.state.retries.get(&order_id) {
            if policy.max_attempts > 0 && attempts.count >= policy.max_attempts {
                return Err(ActionError::RetryRefused(format!(
                    "Order #{order_id} reached the limit of {} assignment attempts; add a driver before trying again",
                    policy.max_attempts
                )));
            }
            let elapsed = now.saturating_duration_since(attempts.last);
            if elapsed < policy.cooldown {
                let wait = (policy.cooldown - elapsed).as_secs_f64().ceil().max(1.0);
                return Err(ActionError::RetryRefused(format!(
                    "Please wait {wait:.0}s before retrying Order #{order_id}"
                )));
            }
        }

        let attempts = self
            .state
            .retries
            .entry(order_id)
            .or_insert(RetryAttempts {
                count: 0,
                last: now,
            });
        attempts.count += 1;
        attempts.last = now;
        Ok(())
    }

    /// Route display is advisory: a malformed payload reads as "no route".
    async fn fetch_driver_route(&self, driver_id: DriverId) -> Result<Vec<LocationId>, ApiError> {
        match self.api.driver_route(driver_id).await {
            Ok(route) => Ok(route),
            Err(err) if err.is_validation_gap() => {
                warn!(driver_id = driver_id.0, "treating malformed route as empty: {err}");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    fn present_route(&self, route: &[LocationId]) -> RoutePresentation {
        let directory = LocationDirectory::new(&self.state.snapshots.locations);
        RoutePresentation::from_stops(format_route(route, |id| directory.name(id)))
    }

    pub async fn show_driver_route(&mut self, driver_id: DriverId) -> Result<Notice, ActionError> {
        let route = self.fetch_driver_route(driver_id).await?;
        Ok(Notice::info(self.present_route(&route).describe()))
    }

    /// First activation fetches and reveals the route; later ones only flip
    /// its visibility.
    pub async fn toggle_driver_route(
        &mut self,
        driver_id: DriverId,
    ) -> Result<Option<Notice>, ActionError> {
        if self.state.view.driver_routes.toggle(driver_id).is_some() {
            self.remount_drivers();
            return Ok(None);
        }

        let route = self.fetch_driver_route(driver_id).await?;
        let presentation = self.present_route(&route);
        if presentation == RoutePresentation::NoRoute {
            return Ok(Some(Notice::info(presentation.describe())));
        }

        self.state
            .view
            .driver_routes
            .insert_fetched(driver_id, presentation);
        self.remount_drivers();
        Ok(None)
    }

    pub async fn find_route(&mut self, form: &RouteForm) -> Result<Notice, ActionError> {
        let request = form.validate()?;
        let outcome = match self.api.find_route(&request).await {
            Ok(response) if !response.path.is_empty() => {
                let directory = LocationDirectory::new(&self.state.snapshots.locations);
                RouteQueryOutcome::Found {
                    stops: format_route(&response.path, |id| directory.name(id)),
                    distance: response.distance,
                }
            }
            Ok(_) => RouteQueryOutcome::NotFound,
            Err(err) if err.is_validation_gap() => {
                warn!("treating malformed route query response as no path: {err}");
                RouteQueryOutcome::NotFound
            }
            Err(err) => RouteQueryOutcome::Failed(err.message),
        };

        self.state
            .view
            .route_result
            .mount(render_route_result(&outcome));

        Ok(match outcome {
            RouteQueryOutcome::Found { distance, .. } => Notice::info(format!(
                "Route found from {} to {} ({distance:.2} units)",
                request.start, request.end
            )),
            RouteQueryOutcome::NotFound => {
                Notice::info("No path found between these locations.")
            }
            RouteQueryOutcome::Failed(message) => Notice::error(format!("Error: {message}")),
        })
    }

    async fn reload_locations(&mut self) {
        match self.api.list_locations().await {
            Ok(locations) => {
                self.state.snapshots.locations = locations;
                self.remount_locations();
            }
            Err(err) => warn!(kind = ?err.kind, "failed to load locations: {err}"),
        }
    }

    async fn reload_drivers(&mut self) {
        match self.api.list_drivers().await {
            Ok(drivers) => {
                self.state.snapshots.drivers = drivers;
                self.state.view.driver_routes.reset();
                self.remount_drivers();
            }
            Err(err) => warn!(kind = ?err.kind, "failed to load drivers: {err}"),
        }
    }

    async fn reload_orders(&mut self) {
        match self.api.list_orders().await {
            Ok(orders) => {
                self.state.snapshots.orders = orders;
                self.prune_retry_attempts();
                self.remount_orders();
            }
            Err(err) => warn!(kind = ?err.kind, "failed to load orders: {err}"),
        }
    }

    fn prune_retry_attempts(&mut self) {
        let orders = &self.state.snapshots.orders;
        self.state.retries.retain(|order_id, _| {
            orders
                .iter()
                .any(|order| order.id == *order_id && order.status == OrderStatus::Pending)
        });
    }

    fn remount_locations(&mut self) {
        let locations = &self.state.snapshots.locations;
        self.state.view.locations.mount(render_locations(locations));
        self.state.view.selections = render_selection_lists(locations);
    }

    fn remount_drivers(&mut self) {
        let directory = LocationDirectory::new(&self.state.snapshots.locations);
        let tree = render_drivers(
            &self.state.snapshots.drivers,
            &directory,
            &self.state.view.driver_routes,
        );
        self.state.view.drivers.mount(tree);
    }

    fn remount_orders(&mut self) {
        let directory = LocationDirectory::new(&self.state.snapshots.locations);
        let views = join_orders_with_drivers(
            &self.state.snapshots.orders,
            &self.state.snapshots.drivers,
        );
        self.state.view.orders.mount(render_orders(&views, &directory));
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
