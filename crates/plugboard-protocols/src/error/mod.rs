//! Error types for the registry layer.

mod registry;

pub use registry::*;

/// Result alias used throughout the registry crates.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
