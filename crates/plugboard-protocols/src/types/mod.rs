//! Common types used across the registry.

mod common;
mod items;

pub use common::*;
pub use items::*;
