//! # Plugboard Protocols
//!
//! Value types shared by the Plugboard registry and the packages that plug
//! into it. Contains no registry logic.
//!
//! ## Contents
//!
//! - [`RegistryError`] - Error taxonomy for every registry operation
//! - [`EntryKind`] - What kind of registry entry an error refers to
//! - [`MemoryItem`] / [`AttentionItem`] - Fragments produced by services
//! - [`HookEvent`] - Events hooks can subscribe to
//! - [`ToolOutput`] - Value returned by a tool executor

pub mod error;
pub mod hook;
pub mod names;
pub mod tool;
pub mod types;

pub use error::{RegistryError, Result};
pub use hook::HookEvent;
pub use names::{PROTECTED_NAME, WILDCARD_SUFFIX, is_protected, wildcard_prefix};
pub use tool::ToolOutput;
pub use types::*;
