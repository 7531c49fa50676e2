//! Package descriptors.
//!
//! A package is the unit a host installs. It may declare a lifecycle and
//! contribute tools, chat commands and hooks. Services and resources are
//! usually registered from the package's start callback.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use plugboard_protocols::Version;

use crate::command::ChatCommand;
use crate::hook::HookDefinition;
use crate::lifecycle::Lifecycle;
use crate::tool::ToolDefinition;

/// An installable package.
#[derive(Clone)]
pub struct Package {
    pub name: String,
    pub version: Version,
    pub description: String,
    pub lifecycle: Option<Arc<dyn Lifecycle>>,
    pub tools: IndexMap<String, ToolDefinition>,
    pub chat_commands: IndexMap<String, Arc<dyn ChatCommand>>,
    pub hooks: IndexMap<String, HookDefinition>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: Version, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            description: description.into(),
            lifecycle: None,
            tools: IndexMap::new(),
            chat_commands: IndexMap::new(),
            hooks: IndexMap::new(),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn Lifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn with_tool(mut self, name: impl Into<String>, tool: ToolDefinition) -> Self {
        self.tools.insert(name.into(), tool);
        self
    }

    pub fn with_chat_command(mut self, name: impl Into<String>, command: Arc<dyn ChatCommand>) -> Self {
        self.chat_commands.insert(name.into(), command);
        self
    }

    pub fn with_hook(mut self, name: impl Into<String>, hook: HookDefinition) -> Self {
        self.hooks.insert(name.into(), hook);
        self
    }

    pub fn info(&self) -> PackageInfo {
        PackageInfo {
            name: self.name.clone(),
            version: self.version.to_string(),
            description: self.description.clone(),
            tools: self.tools.keys().cloned().collect(),
            chat_commands: self.chat_commands.keys().cloned().collect(),
            hooks: self.hooks.keys().cloned().collect(),
        }
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("chat_commands", &self.chat_commands.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Serializable summary of an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub tools: Vec<String>,
    pub chat_commands: Vec<String>,
    pub hooks: Vec<String>,
}
