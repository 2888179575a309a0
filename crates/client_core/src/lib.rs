//! Synchronization and presentation core of the dispatch console.
//!
//! The [`Orchestrator`] turns operator intents into calls on a [`DeliveryApi`],
//! reloads the collections a mutation can affect, and re-mounts the matching
//! view regions. Joining, route formatting and rendering are pure and can be
//! exercised without any transport.

use async_trait::async_trait;
use shared::{
    domain::{Driver, DriverId, Location, LocationId, Order, OrderId},
    error::ApiError,
    protocol::{
        AssignOrderResponse, CreateDriverRequest, CreateDriverResponse, CreateLocationRequest,
        FindRouteRequest, FindRouteResponse, PlaceOrderRequest, PlaceOrderResponse,
    },
};

pub mod forms;
pub mod join;
pub mod orchestrator;
pub mod resource_client;
pub mod route;
pub mod view;

pub use join::{join_orders_with_drivers, DerivedOrderView, DriverSnapshot};
pub use orchestrator::{
    AppState, Intent, Notice, NoticeSeverity, Orchestrator, ReloadSet, RetryPolicy, Snapshots,
};
pub use resource_client::ResourceClient;
pub use route::{format_route, RoutePresentation, RouteStop};
pub use view::{Action, ControlHandle, Fragment, Region, RegionKind, ViewState};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Request/response contract of the remote dispatch service.
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    async fn list_locations(&self) -> ApiResult<Vec<Location>>;
    async fn create_location(&self, request: &CreateLocationRequest) -> ApiResult<()>;
    async fn list_orders(&self) -> ApiResult<Vec<Order>>;
    async fn place_order(&self, request: &PlaceOrderRequest) -> ApiResult<PlaceOrderResponse>;
    async fn complete_order(&self, order_id: OrderId) -> ApiResult<()>;
    async fn assign_order(&self, order_id: OrderId) -> ApiResult<AssignOrderResponse>;
    async fn list_drivers(&self) -> ApiResult<Vec<Driver>>;
    async fn create_driver(&self, request: &CreateDriverRequest)
        -> ApiResult<CreateDriverResponse>;
    async fn driver_route(&self, driver_id: DriverId) -> ApiResult<Vec<LocationId>>;
    async fn find_route(&self, request: &FindRouteRequest) -> ApiResult<FindRouteResponse>;
}
