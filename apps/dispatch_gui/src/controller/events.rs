//! Backend to UI events.

use client_core::{Notice, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Location,
    Order,
    Driver,
    Route,
}

pub enum UiEvent {
    Info(String),
    /// Fresh copy of every mounted region after a command ran.
    ViewChanged(Box<ViewState>),
    ActionFinished {
        form: Option<FormKind>,
        notice: Option<Notice>,
    },
    BackendFailed(String),
}
