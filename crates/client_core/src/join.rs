use std::collections::HashMap;

use shared::domain::{Driver, DriverId, LocationId, Order};

/// Live position of the driver an order is assigned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSnapshot {
    pub id: DriverId,
    pub current_location: LocationId,
    pub speed: f64,
}

/// An order annotated with its driver's live state when that driver is
/// present in the current driver snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedOrderView {
    pub order: Order,
    pub driver: Option<DriverSnapshot>,
}

impl DerivedOrderView {
    /// True only when the assigned driver resolved against the snapshot.
    pub fn has_assigned_driver(&self) -> bool {
        self.driver.is_some()
    }
}

/// Cross-references orders with drivers by id. Never fails: orders without an
/// assignment, or whose driver is missing from `drivers`, pass through with
/// `driver: None`. Output order follows `orders`.
pub fn join_orders_with_drivers(orders: &[Order], drivers: &[Driver]) -> Vec<DerivedOrderView> {
    let lookup: HashMap<DriverId, &Driver> =
        drivers.iter().map(|driver| (driver.id, driver)).collect();

    orders
        .iter()
        .map(|order| {
            let driver = order
                .assigned_driver_id
                .and_then(|driver_id| lookup.get(&driver_id))
                .map(|driver| DriverSnapshot {
                    id: driver.id,
                    current_location: driver.current_location,
                    speed: driver.speed,
                });
            DerivedOrderView {
                order: order.clone(),
                driver,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/join_tests.rs"]
mod tests;
