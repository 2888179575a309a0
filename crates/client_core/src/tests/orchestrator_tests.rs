use super::*;
use crate::{
    view::{Fragment, RegionKind},
    ApiResult,
};
use async_trait::async_trait;
use shared::protocol::{
    AssignOrderResponse, CreateDriverRequest, CreateDriverResponse, CreateLocationRequest,
    FindRouteRequest, FindRouteResponse, PlaceOrderRequest,
};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct FakeState {
    locations: Vec<Location>,
    orders: Vec<Order>,
    drivers: Vec<Driver>,
    calls: Vec<&'static str>,
    next_order_id: i64,
    next_driver_id: i64,
    available_driver: Option<DriverId>,
    driver_routes: HashMap<DriverId, ApiResult<Vec<LocationId>>>,
    route_query: Option<ApiResult<FindRouteResponse>>,
    lists_down: bool,
    mutation_failure: Option<ApiError>,
}

impl FakeState {
    fn check_mutation(&self) -> ApiResult<()> {
        match &self.mutation_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn check_lists(&self) -> ApiResult<()> {
        if self.lists_down {
            return Err(ApiError::transport("connection refused"));
        }
        Ok(())
    }

    fn assign(&mut self, order_id: OrderId, driver_id: DriverId) {
        if let Some(order) = self.orders.iter_mut().find(|order| order.id == order_id) {
            order.status = OrderStatus::Assigned;
            order.assigned_driver_id = Some(driver_id);
        }
        if let Some(driver) = self.drivers.iter_mut().find(|driver| driver.id == driver_id) {
            driver.assigned_orders.push(order_id);
        }
    }
}

struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    fn new(state: FakeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    fn take_calls(&self) -> Vec<&'static str> {
        std::mem::take(&mut self.lock().calls)
    }

    fn count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|made| **made == call).count()
    }
}

#[async_trait]
impl DeliveryApi for FakeApi {
    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        let mut state = self.lock();
        state.calls.push("list_locations");
        state.check_lists()?;
        Ok(state.locations.clone())
    }

    async fn create_location(&self, request: &CreateLocationRequest) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push("create_location");
        state.check_mutation()?;
        state.locations.push(Location {
            id: request.id,
            name: request.name.clone(),
            x: request.x,
            y: request.y,
        });
        Ok(())
    }

    async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        let mut state = self.lock();
        state.calls.push("list_orders");
        state.check_lists()?;
        Ok(state.orders.clone())
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> ApiResult<PlaceOrderResponse> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.calls.push("place_order");
        state.check_mutation()?;

        let order_id = OrderId(state.next_order_id);
        state.next_order_id += 1;
        state.orders.push(Order {
            id: order_id,
            restaurant_id: request.restaurant_id,
            customer_location_id: request.customer_location_id,
            status: OrderStatus::Pending,
            assigned_driver_id: None,
        });

        let available = state.available_driver;
        let response = match available {
            Some(driver_id) => {
                state.assign(order_id, driver_id);
                PlaceOrderResponse {
                    order_id,
                    status: Some(OrderStatus::Assigned),
                    driver_id: Some(driver_id),
                    driver_location: Some(request.restaurant_id),
                    driver_speed: Some(1.5),
                    route: Some(vec![
                        request.restaurant_id,
                        LocationId(5),
                        request.customer_location_id,
                    ]),
                    message: None,
                }
            }
            None => PlaceOrderResponse {
                order_id,
                status: Some(OrderStatus::Pending),
                driver_id: None,
                driver_location: None,
                driver_speed: None,
                route: None,
                message: Some("No suitable driver available".to_string()),
            },
        };
        Ok(response)
    }

    async fn complete_order(&self, order_id: OrderId) -> ApiResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.calls.push("complete_order");
        state.check_mutation()?;
        if let Some(order) = state.orders.iter_mut().find(|order| order.id == order_id) {
            order.status = OrderStatus::Delivered;
        }
        for driver in &mut state.drivers {
            driver.assigned_orders.retain(|assigned| *assigned != order_id);
        }
        Ok(())
    }

    async fn assign_order(&self, order_id: OrderId) -> ApiResult<AssignOrderResponse> {
        let mut state = self.lock();
        state.calls.push("assign_order");
        state.check_mutation()?;
        let available = state.available_driver;
        Ok(match available {
            Some(driver_id) => {
                state.assign(order_id, driver_id);
                AssignOrderResponse {
                    success: Some(true),
                    order_id: Some(order_id),
                    driver_id: Some(driver_id),
                    message: None,
                }
            }
            None => AssignOrderResponse {
                success: Some(false),
                order_id: Some(order_id),
                driver_id: None,
                message: Some("No suitable driver available".to_string()),
            },
        })
    }

    async fn list_drivers(&self) -> ApiResult<Vec<Driver>> {
        let mut state = self.lock();
        state.calls.push("list_drivers");
        state.check_lists()?;
        Ok(state.drivers.clone())
    }

    async fn create_driver(
        &self,
        request: &CreateDriverRequest,
    ) -> ApiResult<CreateDriverResponse> {
        let mut state = self.lock();
        state.calls.push("create_driver");
        state.check_mutation()?;
        let driver_id = DriverId(state.next_driver_id);
        state.next_driver_id += 1;
        state.drivers.push(Driver {
            id: driver_id,
            speed: request.speed,
            current_location: LocationId(1),
            assigned_orders: Vec::new(),
        });
        Ok(CreateDriverResponse { driver_id })
    }

    async fn driver_route(&self, driver_id: DriverId) -> ApiResult<Vec<LocationId>> {
        let mut state = self.lock();
        state.calls.push("driver_route");
        state
            .driver_routes
            .get(&driver_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn find_route(&self, _request: &FindRouteRequest) -> ApiResult<FindRouteResponse> {
        let mut state = self.lock();
        state.calls.push("find_route");
        state.route_query.clone().unwrap_or_else(|| {
            Ok(FindRouteResponse {
                path: Vec::new(),
                distance: 0.0,
            })
        })
    }
}

fn location(id: i64, name: &str) -> Location {
    Location {
        id: LocationId(id),
        name: name.to_string(),
        x: id as f64,
        y: 0.0,
    }
}

fn driver(id: i64, at: i64, orders: &[i64]) -> Driver {
    Driver {
        id: DriverId(id),
        speed: 1.5,
        current_location: LocationId(at),
        assigned_orders: orders.iter().copied().map(OrderId).collect(),
    }
}

fn order(id: i64, status: OrderStatus, driver: Option<i64>) -> Order {
    Order {
        id: OrderId(id),
        restaurant_id: LocationId(1),
        customer_location_id: LocationId(2),
        status,
        assigned_driver_id: driver.map(DriverId),
    }
}

fn seeded() -> FakeState {
    FakeState {
        locations: vec![
            location(1, "Depot"),
            location(2, "Harbour"),
            location(5, "Market"),
            location(7, "Station"),
        ],
        next_order_id: 10,
        next_driver_id: 4,
        ..FakeState::default()
    }
}

async fn loaded(state: FakeState, policy: RetryPolicy) -> Orchestrator<FakeApi> {
    let mut orchestrator = Orchestrator::new(FakeApi::new(state), policy);
    assert_eq!(orchestrator.perform(Intent::LoadAll).await, None);
    orchestrator.api().take_calls();
    orchestrator
}

fn handle_for(view: &ViewState, kind: RegionKind, label: &str, data_id: i64) -> ControlHandle {
    view.region(kind)
        .controls()
        .into_iter()
        .find(|(_, control)| control.label == label && control.data_id == data_id)
        .map(|(handle, _)| handle)
        .unwrap_or_else(|| panic!("no '{label}' control for {data_id} in {}", kind.label()))
}

fn control_labels(view: &ViewState, kind: RegionKind) -> Vec<String> {
    view.region(kind)
        .controls()
        .into_iter()
        .map(|(_, control)| control.label.clone())
        .collect()
}

async fn notice_for(orchestrator: &mut Orchestrator<FakeApi>, intent: Intent) -> Notice {
    orchestrator
        .perform(intent)
        .await
        .expect("intent produces a notice")
}

#[tokio::test]
async fn initial_load_fetches_every_collection_and_mounts_regions() {
    let mut state = seeded();
    state.drivers.push(driver(4, 1, &[]));
    let mut orchestrator = Orchestrator::new(FakeApi::new(state), RetryPolicy::default());

    assert_eq!(orchestrator.perform(Intent::LoadAll).await, None);
    assert_eq!(
        orchestrator.api().take_calls(),
        vec!["list_locations", "list_drivers", "list_orders"]
    );

    let view = orchestrator.view();
    assert!(view.locations.is_mounted());
    assert!(view.drivers.is_mounted());
    assert_eq!(
        view.orders.tree(),
        &[Fragment::Empty("No orders placed yet".to_string())]
    );
    assert_eq!(view.selections.restaurant.len(), 5);
    assert_eq!(view.selections.route_end[1].label, "Depot (ID: 1)");
    assert!(!view.route_result.is_mounted());
}

#[tokio::test]
async fn adding_a_location_reloads_only_locations() {
    let mut orchestrator = loaded(seeded(), RetryPolicy::default()).await;
    let orders_generation = orchestrator.view().orders.generation();

    let notice = notice_for(
        &mut orchestrator,
        Intent::AddLocation(LocationForm {
            id: "3".to_string(),
            name: "Depot".to_string(),
            x: "1".to_string(),
            y: "2".to_string(),
        }),
    )
    .await;

    assert_eq!(notice, Notice::info("Location #3 (Depot) added successfully!"));
    assert_eq!(
        orchestrator.api().take_calls(),
        vec!["create_location", "list_locations"]
    );
    assert_eq!(orchestrator.state().snapshots.locations.len(), 5);
    assert_eq!(orchestrator.view().selections.customer.len(), 6);
    assert_eq!(orchestrator.view().orders.generation(), orders_generation);
}

#[tokio::test]
async fn placed_order_with_driver_can_be_delivered() {
    let mut state = seeded();
    state.drivers.push(driver(4, 1, &[]));
    state.available_driver = Some(DriverId(4));
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let notice = notice_for(
        &mut orchestrator,
        Intent::PlaceOrder(OrderForm {
            restaurant: Some(LocationId(1)),
            customer: Some(LocationId(2)),
        }),
    )
    .await;
    assert_eq!(
        notice.text,
        "Order #10 placed successfully!\nAssigned to Driver #4\nDelivery Route: 1 → 5 → 2"
    );
    assert_eq!(
        orchestrator.api().take_calls(),
        vec!["place_order", "list_drivers", "list_orders"]
    );
    assert_eq!(
        control_labels(orchestrator.view(), RegionKind::Orders),
        vec!["Mark Delivered", "Show Route"]
    );
    let Fragment::Item(children) = &orchestrator.view().orders.tree()[0] else {
        panic!("expected an order item");
    };
    assert!(children.contains(&Fragment::Text(
        "Assigned to: Driver #4 (at Depot (ID: 1), speed: 1.5)".to_string()
    )));

    let complete = handle_for(orchestrator.view(), RegionKind::Orders, "Mark Delivered", 10);
    let notice = notice_for(&mut orchestrator, Intent::Activate(complete)).await;
    assert_eq!(notice, Notice::info("Order #10 marked as delivered!"));
    assert_eq!(
        orchestrator.api().take_calls(),
        vec!["complete_order", "list_drivers", "list_orders"]
    );
    assert_eq!(
        orchestrator.state().snapshots.orders[0].status,
        OrderStatus::Delivered
    );
    assert!(control_labels(orchestrator.view(), RegionKind::Orders).is_empty());
}

#[tokio::test]
async fn order_without_driver_is_pending_until_retry_succeeds() {
    let mut state = seeded();
    state.next_order_id = 11;
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let notice = notice_for(
        &mut orchestrator,
        Intent::PlaceOrder(OrderForm {
            restaurant: Some(LocationId(1)),
            customer: Some(LocationId(2)),
        }),
    )
    .await;
    assert_eq!(
        notice.text,
        "Order #11 placed successfully!\nNo suitable driver available\nOrder marked as pending. Try again later."
    );
    assert!(!notice.is_error());
    assert_eq!(
        control_labels(orchestrator.view(), RegionKind::Orders),
        vec!["Try Again"]
    );

    {
        let mut state = orchestrator.api().lock();
        state.drivers.push(driver(4, 5, &[]));
        state.available_driver = Some(DriverId(4));
    }
    orchestrator.api().take_calls();

    let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    let notice = notice_for(&mut orchestrator, Intent::Activate(retry)).await;
    assert_eq!(notice, Notice::info("Order #11 assigned to Driver #4"));
    assert_eq!(
        orchestrator.api().take_calls(),
        vec!["assign_order", "list_drivers", "list_orders"]
    );
    assert_eq!(
        control_labels(orchestrator.view(), RegionKind::Orders),
        vec!["Mark Delivered", "Show Route"]
    );
    assert!(orchestrator.state().retries.is_empty());
}

#[tokio::test]
async fn controls_from_a_replaced_tree_do_not_fire() {
    let mut state = seeded();
    state.orders.push(order(11, OrderStatus::Pending, None));
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let stale = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    orchestrator.perform(Intent::LoadAll).await;
    orchestrator.api().take_calls();

    assert_eq!(orchestrator.perform(Intent::Activate(stale)).await, None);
    assert!(orchestrator.api().take_calls().is_empty());

    let fresh = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    assert_ne!(stale, fresh);
    let notice = notice_for(&mut orchestrator, Intent::Activate(fresh)).await;
    assert_eq!(
        notice,
        Notice::info("Still no suitable driver available for Order #11")
    );
    assert_eq!(orchestrator.api().count("assign_order"), 1);
}

#[tokio::test]
async fn failed_mutation_skips_reload_and_keeps_snapshots() {
    let mut state = seeded();
    state.mutation_failure = Some(ApiError::service(503, "Driver service offline"));
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;
    let drivers_generation = orchestrator.view().drivers.generation();

    let notice = notice_for(
        &mut orchestrator,
        Intent::AddDriver(DriverForm {
            speed: "2".to_string(),
        }),
    )
    .await;

    assert_eq!(notice, Notice::error("Error: Driver service offline"));
    assert_eq!(orchestrator.api().take_calls(), vec!["create_driver"]);
    assert!(orchestrator.state().snapshots.drivers.is_empty());
    assert_eq!(orchestrator.view().drivers.generation(), drivers_generation);
}

#[tokio::test]
async fn invalid_form_sends_no_request() {
    let mut orchestrator = loaded(seeded(), RetryPolicy::default()).await;

    let notice = notice_for(
        &mut orchestrator,
        Intent::PlaceOrder(OrderForm {
            restaurant: Some(LocationId(1)),
            customer: None,
        }),
    )
    .await;
    assert_eq!(notice, Notice::error("Error: Customer location is required"));

    let notice = notice_for(
        &mut orchestrator,
        Intent::AddDriver(DriverForm {
            speed: "-1".to_string(),
        }),
    )
    .await;
    assert!(notice.is_error());
    assert!(orchestrator.api().take_calls().is_empty());
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_view() {
    let mut orchestrator = loaded(seeded(), RetryPolicy::default()).await;
    let generation = orchestrator.view().locations.generation();
    orchestrator.api().lock().lists_down = true;

    let notice = notice_for(
        &mut orchestrator,
        Intent::AddLocation(LocationForm {
            id: "9".to_string(),
            name: "Mill".to_string(),
            x: "0".to_string(),
            y: "0".to_string(),
        }),
    )
    .await;

    assert_eq!(notice, Notice::info("Location #9 (Mill) added successfully!"));
    assert_eq!(orchestrator.view().locations.generation(), generation);
    assert_eq!(orchestrator.state().snapshots.locations.len(), 4);
}

#[tokio::test]
async fn driver_route_toggle_fetches_once_and_resets_on_reload() {
    let mut state = seeded();
    state.drivers.push(driver(4, 1, &[10]));
    state.orders.push(order(10, OrderStatus::Assigned, Some(4)));
    state.driver_routes.insert(
        DriverId(4),
        Ok(vec![LocationId(1), LocationId(1), LocationId(5)]),
    );
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let show = handle_for(orchestrator.view(), RegionKind::Drivers, "Show Route", 4);
    assert_eq!(orchestrator.perform(Intent::Activate(show)).await, None);
    assert_eq!(orchestrator.api().take_calls(), vec!["driver_route"]);

    let Fragment::Item(children) = &orchestrator.view().drivers.tree()[0] else {
        panic!("expected a driver item");
    };
    assert!(children.contains(&Fragment::Disclosure {
        visible: true,
        children: vec![Fragment::Text(
            "Optimal Route: 1 (Depot) → 5 (Market)".to_string()
        )],
    }));

    let hide = handle_for(orchestrator.view(), RegionKind::Drivers, "Hide Route", 4);
    assert_eq!(orchestrator.perform(Intent::Activate(hide)).await, None);
    assert!(orchestrator.api().take_calls().is_empty());
    assert_eq!(
        control_labels(orchestrator.view(), RegionKind::Drivers),
        vec!["Show Route"]
    );

    orchestrator.reload(ReloadSet::DRIVERS).await;
    assert!(orchestrator.view().driver_routes.is_empty());
}

#[tokio::test]
async fn order_show_route_describes_the_driver_route_without_reloading() {
    let mut state = seeded();
    state.drivers.push(driver(4, 1, &[10]));
    state.orders.push(order(10, OrderStatus::InTransit, Some(4)));
    state
        .driver_routes
        .insert(DriverId(4), Ok(vec![LocationId(1), LocationId(5)]));
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let show = handle_for(orchestrator.view(), RegionKind::Orders, "Show Route", 4);
    let notice = notice_for(&mut orchestrator, Intent::Activate(show)).await;
    assert_eq!(
        notice,
        Notice::info("Delivery Route: 1 (Depot) → 5 (Market)")
    );
    assert_eq!(orchestrator.api().take_calls(), vec!["driver_route"]);

    orchestrator
        .api()
        .lock()
        .driver_routes
        .insert(DriverId(4), Ok(vec![LocationId(7), LocationId(7)]));
    let show = handle_for(orchestrator.view(), RegionKind::Orders, "Show Route", 4);
    let notice = notice_for(&mut orchestrator, Intent::Activate(show)).await;
    assert_eq!(
        notice.text,
        "Driver is already at the destination: 7 (Station)"
    );
}

#[tokio::test]
async fn malformed_or_failed_route_fetches() {
    let mut state = seeded();
    state.drivers.push(driver(4, 1, &[10]));
    state.orders.push(order(10, OrderStatus::Assigned, Some(4)));
    state.driver_routes.insert(
        DriverId(4),
        Err(ApiError::validation_gap("route is not a list")),
    );
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let show = handle_for(orchestrator.view(), RegionKind::Orders, "Show Route", 4);
    let notice = notice_for(&mut orchestrator, Intent::Activate(show)).await;
    assert_eq!(notice, Notice::info("No route available for this driver"));

    let toggle = handle_for(orchestrator.view(), RegionKind::Drivers, "Show Route", 4);
    let notice = notice_for(&mut orchestrator, Intent::Activate(toggle)).await;
    assert_eq!(notice, Notice::info("No route available for this driver"));
    assert!(orchestrator.view().driver_routes.is_empty());

    orchestrator.api().lock().driver_routes.insert(
        DriverId(4),
        Err(ApiError::service(500, "route engine down")),
    );
    let show = handle_for(orchestrator.view(), RegionKind::Orders, "Show Route", 4);
    let notice = notice_for(&mut orchestrator, Intent::Activate(show)).await;
    assert_eq!(notice, Notice::error("Error: route engine down"));
}

#[tokio::test]
async fn retry_attempts_are_bounded_until_a_driver_is_added() {
    let mut state = seeded();
    state.orders.push(order(11, OrderStatus::Pending, None));
    let policy = RetryPolicy {
        max_attempts: 2,
        cooldown: Duration::ZERO,
    };
    let mut orchestrator = loaded(state, policy).await;

    for _ in 0..2 {
        let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
        let notice = notice_for(&mut orchestrator, Intent::Activate(retry)).await;
        assert!(!notice.is_error());
    }

    let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    let notice = notice_for(&mut orchestrator, Intent::Activate(retry)).await;
    assert!(notice.is_error());
    assert!(notice.text.contains("limit of 2 assignment attempts"));
    assert_eq!(orchestrator.api().count("assign_order"), 2);

    notice_for(
        &mut orchestrator,
        Intent::AddDriver(DriverForm {
            speed: "2.5".to_string(),
        }),
    )
    .await;
    let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    let notice = notice_for(&mut orchestrator, Intent::Activate(retry)).await;
    assert!(!notice.is_error());
    assert_eq!(orchestrator.api().count("assign_order"), 3);
}

#[tokio::test]
async fn retry_attempts_respect_the_cooldown() {
    let mut state = seeded();
    state.orders.push(order(11, OrderStatus::Pending, None));
    let policy = RetryPolicy {
        max_attempts: 0,
        cooldown: Duration::from_secs(60),
    };
    let mut orchestrator = loaded(state, policy).await;

    let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    notice_for(&mut orchestrator, Intent::Activate(retry)).await;

    let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    let notice = notice_for(&mut orchestrator, Intent::Activate(retry)).await;
    assert_eq!(
        notice,
        Notice::error("Error: Please wait 60s before retrying Order #11")
    );
    assert_eq!(orchestrator.api().count("assign_order"), 1);
}

#[tokio::test]
async fn retry_counters_are_dropped_once_an_order_leaves_pending() {
    let mut state = seeded();
    state.orders.push(order(11, OrderStatus::Pending, None));
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;

    let retry = handle_for(orchestrator.view(), RegionKind::Orders, "Try Again", 11);
    notice_for(&mut orchestrator, Intent::Activate(retry)).await;
    assert_eq!(orchestrator.state().retries.len(), 1);

    orchestrator.api().lock().orders[0].status = OrderStatus::Delivered;
    orchestrator.perform(Intent::LoadAll).await;
    assert!(orchestrator.state().retries.is_empty());
}

#[tokio::test]
async fn find_route_mounts_the_result_region_without_reloading() {
    let mut state = seeded();
    state.route_query = Some(Ok(FindRouteResponse {
        path: vec![LocationId(1), LocationId(5), LocationId(2)],
        distance: 7.5,
    }));
    let mut orchestrator = loaded(state, RetryPolicy::default()).await;
    let form = RouteForm {
        start: Some(LocationId(1)),
        end: Some(LocationId(2)),
    };

    let notice = notice_for(&mut orchestrator, Intent::FindRoute(form)).await;
    assert_eq!(notice, Notice::info("Route found from 1 to 2 (7.50 units)"));
    assert_eq!(orchestrator.api().take_calls(), vec!["find_route"]);
    assert_eq!(
        orchestrator.view().route_result.tree()[1],
        Fragment::Text("Path: 1 (Depot) → 5 (Market) → 2 (Harbour)".to_string())
    );

    orchestrator.api().lock().route_query = Some(Ok(FindRouteResponse {
        path: Vec::new(),
        distance: 0.0,
    }));
    let notice = notice_for(&mut orchestrator, Intent::FindRoute(form)).await;
    assert_eq!(notice.text, "No path found between these locations.");

    orchestrator.api().lock().route_query = Some(Err(ApiError::service(400, "Unknown location")));
    let notice = notice_for(&mut orchestrator, Intent::FindRoute(form)).await;
    assert_eq!(notice, Notice::error("Error: Unknown location"));
    assert_eq!(
        orchestrator.view().route_result.tree(),
        &[Fragment::Error("Error: Unknown location".to_string())]
    );
}
