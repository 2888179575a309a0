use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(LocationId);
id_newtype!(DriverId);
id_newtype!(OrderId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: DriverId,
    pub speed: f64,
    pub current_location: LocationId,
    #[serde(default)]
    pub assigned_orders: Vec<OrderId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub restaurant_id: LocationId,
    pub customer_location_id: LocationId,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<DriverId>,
}

/// Order lifecycle as reported by the dispatch service.
///
/// Unknown labels are kept verbatim so the console never shows a state the
/// service did not send.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Preparing,
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Other(String),
}

impl OrderStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Preparing => "Preparing",
            Self::Pending => "Pending",
            Self::Assigned => "Assigned",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Other(label) => label,
        }
    }

    /// Style class in the `status-<kebab>` form, e.g. `status-in-transit`.
    pub fn css_class(&self) -> String {
        let slug = self
            .label()
            .trim()
            .to_ascii_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("status-{slug}")
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Preparing" => Self::Preparing,
            "Pending" => Self::Pending,
            "Assigned" => Self::Assigned,
            "In Transit" | "InTransit" => Self::InTransit,
            "Delivered" => Self::Delivered,
            _ => Self::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
