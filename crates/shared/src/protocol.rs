use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{DriverId, LocationId, OrderId, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLocationRequest {
    pub id: LocationId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub restaurant_id: LocationId,
    pub customer_location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_location: Option<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_speed: Option<f64>,
    /// Malformed route payloads are read as "no route".
    #[serde(
        default,
        deserialize_with = "lenient_route",
        skip_serializing_if = "Option::is_none"
    )]
    pub route: Option<Vec<LocationId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOrderResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreateDriverRequest {
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverResponse {
    pub driver_id: DriverId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRouteResponse {
    pub route: Vec<LocationId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindRouteRequest {
    pub start: LocationId,
    pub end: LocationId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindRouteResponse {
    pub path: Vec<LocationId>,
    #[serde(default)]
    pub distance: f64,
}

fn lenient_route<'de, D>(deserializer: D) -> Result<Option<Vec<LocationId>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<Vec<LocationId>>(raw).ok())
}
