//! # Plugboard Config
//!
//! TOML configuration for a Plugboard host: logging settings and the
//! activation lists applied to a started registry.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
