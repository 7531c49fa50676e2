//! # Plugboard Core
//!
//! Registry for installable packages and the capabilities they contribute.
//!
//! ## Components
//!
//! - [`Registry`] - The root registry owning packages and sub-registries
//! - [`Capability`], [`Service`], [`Resource`] - Contracts for registry-managed objects
//! - [`Package`] - The installable unit, declaring tools, chat commands and hooks
//! - Sub-registries for services, resources, tools, hooks and chat commands
//!
//! ## Activation
//!
//! Resources, tools and hooks have two tiers: *available* once registered,
//! *active* once enabled. Active entries run only while the root registry
//! is started. Services run whenever the registry is started.

pub mod capability;
pub mod command;
pub mod hook;
pub mod lifecycle;
pub mod package;
pub mod registry;
pub mod root;
pub mod tool;

#[cfg(test)]
mod testing;

pub use capability::{
    BasicResource, Capability, CapabilityHandle, Resource, ResourceHandle, Service, ServiceHandle,
};
pub use command::ChatCommand;
pub use hook::{HookCallback, HookConfig, HookDefinition};
pub use lifecycle::{Lifecycle, RegistryState};
pub use package::{Package, PackageInfo};
pub use registry::{
    ChatCommandRegistry, HookRegistry, ResourceRegistry, ServiceRegistry, ToolRegistry,
};
pub use root::Registry;
pub use tool::{RegisteredTool, ToolDefinition, ToolExecutor, UNKNOWN_PACKAGE};
