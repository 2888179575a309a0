//! Backend commands queued from UI to backend worker.

use client_core::{
    forms::{DriverForm, LocationForm, OrderForm, RouteForm},
    ControlHandle, Intent,
};

use crate::controller::events::FormKind;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    LoadAll,
    AddLocation(LocationForm),
    PlaceOrder(OrderForm),
    AddDriver(DriverForm),
    FindRoute(RouteForm),
    Activate(ControlHandle),
}

impl BackendCommand {
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

    /// The form that submitted this command, if any.
    pub fn form(&self) -> Option<FormKind> {
        match self {
            Self::AddLocation(_) => Some(FormKind::Location),
            Self::PlaceOrder(_) => Some(FormKind::Order),
            Self::AddDriver(_) => Some(FormKind::Driver),
            Self::FindRoute(_) => Some(FormKind::Route),
            Self::LoadAll | Self::Activate(_) => None,
        }
    }

    pub fn into_intent(self) -> Intent {
        match self {
            Self::LoadAll => Intent::LoadAll,
            Self::AddLocation(form) => Intent::AddLocation(form),
            Self::PlaceOrder(form) => Intent::PlaceOrder(form),
            Self::AddDriver(form) => Intent::AddDriver(form),
            Self::FindRoute(form) => Intent::FindRoute(form),
            Self::Activate(handle) => Intent::Activate(handle),
        }
    }
}
