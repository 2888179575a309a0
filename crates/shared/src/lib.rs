//! Wire and domain types shared by the dispatch console crates.

pub mod domain;
pub mod error;
pub mod protocol;
