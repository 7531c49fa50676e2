//! Chat command registry.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use tracing::debug;

use crate::command::ChatCommand;

/// Registry for chat commands, keyed by name. Single tier: a registered
/// command is always available.
pub struct ChatCommandRegistry {
    commands: RwLock<IndexMap<String, Arc<dyn ChatCommand>>>,
}

impl ChatCommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(IndexMap::new()),
        }
    }

    /// Register a command, replacing any command of the same name.
    pub fn add_command(&self, name: impl Into<String>, command: Arc<dyn ChatCommand>) {
        let name = name.into();
        debug!(command = %name, "Chat command registered");
        self.commands.write().insert(name, command);
    }

    pub fn remove_command(&self, name: &str) -> bool {
        self.commands.write().shift_remove(name).is_some()
    }

    pub fn get_command(&self, name: &str) -> Option<Arc<dyn ChatCommand>> {
        self.commands.read().get(name).cloned()
    }

    pub fn get_commands(&self) -> Vec<(String, Arc<dyn ChatCommand>)> {
        self.commands
            .read()
            .iter()
            .map(|(name, command)| (name.clone(), Arc::clone(command)))
            .collect()
    }

    pub fn get_available_command_names(&self) -> Vec<String> {
        self.commands.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

impl Default for ChatCommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
