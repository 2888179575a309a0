//! Controller layer: backend events and command dispatch from the UI.

pub mod events;
pub mod orchestration;
