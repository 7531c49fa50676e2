//! Sub-registries owned by the root [`Registry`](crate::Registry).
//!
//! Services, resources, tools and hooks follow the root lifecycle; chat
//! commands have none.

mod chat_command;
mod hook;
mod resource;
mod service;
mod tool;

pub use chat_command::ChatCommandRegistry;
pub use hook::HookRegistry;
pub use resource::ResourceRegistry;
pub use service::ServiceRegistry;
pub use tool::ToolRegistry;
