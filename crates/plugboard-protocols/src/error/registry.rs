//! Registry errors.

use thiserror::Error;

use crate::types::EntryKind;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntryKind, name: String },

    #[error("{kind} already registered: {name}")]
    AlreadyRegistered { kind: EntryKind, name: String },

    #[error("Cannot deactivate protected {kind:#}: {name}")]
    ProtectedName { kind: EntryKind, name: String },

    #[error("Type mismatch for {name}: expected {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("{0} does not implement a status method")]
    Unimplemented(String),

    #[error("{kind} is not enabled: {name}")]
    NotEnabled { kind: EntryKind, name: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid registry state: {0}")]
    InvalidState(String),

    #[error("{name} failed to start: {message}")]
    StartFailed { name: String, message: String },

    #[error("{name} failed to stop: {message}")]
    StopFailed { name: String, message: String },

    #[error("{0}")]
    Custom(String),
}

impl RegistryError {
    pub fn not_found(kind: EntryKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn protected(kind: EntryKind, name: impl Into<String>) -> Self {
        Self::ProtectedName {
            kind,
            name: name.into(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// True for the default `status()` failure, which callers read as
    /// "status not supported" rather than a fault.
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
