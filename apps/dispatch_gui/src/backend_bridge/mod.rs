//! Backend bridge: command queue consumed by the worker that owns the orchestrator.

pub mod commands;
pub mod runtime;
