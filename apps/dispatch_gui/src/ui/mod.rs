//! UI layer: the operator console shell and fragment painting.

pub mod app;

pub use app::DispatchApp;
