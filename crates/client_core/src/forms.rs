//! Operator form intake.
//!
//! Forms hold raw text as typed; `validate` turns them into requests or a
//! [`FormError`] before anything is sent.

use shared::{
    domain::LocationId,
    protocol::{CreateDriverRequest, CreateLocationRequest, FindRouteRequest, PlaceOrderRequest},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a whole number, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Missing { field });
    }
    Ok(trimmed)
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, FormError> {
    let raw = required(field, value)?;
    raw.parse::<i64>().map_err(|_| FormError::NotAnInteger {
        field,
        value: raw.to_string(),
    })
}

fn parse_real(field: &'static str, value: &str) -> Result<f64, FormError> {
    let raw = required(field, value)?;
    match raw.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(FormError::NotANumber {
            field,
            value: raw.to_string(),
        }),
    }
}

fn selected(field: &'static str, value: Option<LocationId>) -> Result<LocationId, FormError> {
    value.ok_or(FormError::Missing { field })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationForm {
    pub id: String,
    pub name: String,
    pub x: String,
    pub y: String,
}

impl LocationForm {
    pub fn validate(&self) -> Result<CreateLocationRequest, FormError> {
        Ok(CreateLocationRequest {
            id: LocationId(parse_integer("Location ID", &self.id)?),
            name: required("Name", &self.name)?.to_string(),
            x: parse_real("X coordinate", &self.x)?,
            y: parse_real("Y coordinate", &self.y)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub restaurant: Option<LocationId>,
    pub customer: Option<LocationId>,
}

impl OrderForm {
    pub fn validate(&self) -> Result<PlaceOrderRequest, FormError> {
        Ok(PlaceOrderRequest {
            restaurant_id: selected("Restaurant", self.restaurant)?,
            customer_location_id: selected("Customer location", self.customer)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverForm {
    pub speed: String,
}

impl DriverForm {
    pub fn validate(&self) -> Result<CreateDriverRequest, FormError> {
        let speed = parse_real("Speed", &self.speed)?;
        if speed <= 0.0 {
            return Err(FormError::NotPositive { field: "Speed" });
        }
        Ok(CreateDriverRequest { speed })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteForm {
    pub start: Option<LocationId>,
    pub end: Option<LocationId>,
}

impl RouteForm {
    pub fn validate(&self) -> Result<FindRouteRequest, FormError> {
        Ok(FindRouteRequest {
            start: selected("Start location", self.start)?,
            end: selected("End location", self.end)?,
        })
    }
}
