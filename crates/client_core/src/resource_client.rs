//! HTTP implementation of [`DeliveryApi`].

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Driver, DriverId, Location, LocationId, Order, OrderId},
    error::ApiError,
    protocol::{
        AssignOrderResponse, CreateDriverRequest, CreateDriverResponse, CreateLocationRequest,
        DriverRouteResponse, FindRouteRequest, FindRouteResponse, OrderRef, PlaceOrderRequest,
        PlaceOrderResponse,
    },
};
use tracing::{debug, warn};

use crate::{ApiResult, DeliveryApi};

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    api_base: String,
}

impl ResourceClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), api_base)
    }

    pub fn with_http_client(http: Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint.trim_start_matches('/'))
    }

    /// Issues one request and returns the raw success body.
    ///
    /// Non-success responses become [`ApiError`]s carrying the service's own
    /// message when the body has one.
    pub async fn request_raw<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResult<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        debug!(%method, endpoint, "dispatch api request");
        let mut builder = self.http.request(method.clone(), self.endpoint_url(endpoint));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(%method, endpoint, "dispatch api transport failure: {err}");
            ApiError::transport(format!("failed to reach dispatch service: {err}"))
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            warn!(%method, endpoint, "failed to read dispatch api response: {err}");
            ApiError::transport(format!("failed to read response body: {err}"))
        })?;

        if !status.is_success() {
            let err = ApiError::from_response_body(status.as_u16(), &bytes);
            warn!(%method, endpoint, status = status.as_u16(), "dispatch api error: {err}");
            return Err(err);
        }

        Ok(bytes.to_vec())
    }

    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.request_raw(method, endpoint, body).await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            warn!(endpoint, "malformed dispatch api payload: {err}");
            ApiError::validation_gap(format!("unexpected response from {endpoint}: {err}"))
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }
}

#[async_trait]
impl DeliveryApi for ResourceClient {
    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        self.get("locations").await
    }

    async fn create_location(&self, request: &CreateLocationRequest) -> ApiResult<()> {
        self.request_raw(Method::POST, "locations", Some(request))
            .await
            .map(|_| ())
    }

    async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        self.get("orders").await
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> ApiResult<PlaceOrderResponse> {
        self.post("orders", request).await
    }

    async fn complete_order(&self, order_id: OrderId) -> ApiResult<()> {
        self.request_raw(Method::POST, "orders/complete", Some(&OrderRef { order_id }))
            .await
            .map(|_| ())
    }

    async fn assign_order(&self, order_id: OrderId) -> ApiResult<AssignOrderResponse> {
        self.post("orders/assign", &OrderRef { order_id }).await
    }

    async fn list_drivers(&self) -> ApiResult<Vec<Driver>> {
        self.get("drivers").await
    }

    async fn create_driver(
        &self,
        request: &CreateDriverRequest,
    ) -> ApiResult<CreateDriverResponse> {
        self.post("drivers", request).await
    }

    async fn driver_route(&self, driver_id: DriverId) -> ApiResult<Vec<LocationId>> {
        let response: DriverRouteResponse = self
            .get(&format!("drivers/route?id={}", driver_id.0))
            .await?;
        Ok(response.route)
    }

    async fn find_route(&self, request: &FindRouteRequest) -> ApiResult<FindRouteResponse> {
        self.post("route", request).await
    }
}

#[cfg(test)]
#[path = "tests/resource_client_tests.rs"]
mod tests;
