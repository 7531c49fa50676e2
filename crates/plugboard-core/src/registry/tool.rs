//! Tool registry.
//!
//! Tools are keyed by name across all packages; the last registration for
//! a name wins. Enabling a tool runs its lifecycle start callback, but only
//! while the registry is started.

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use plugboard_protocols::{EntryKind, RegistryError, Result, ToolOutput, is_protected};

use crate::capability::Capability;
use crate::root::Registry;
use crate::tool::RegisteredTool;

#[derive(Default)]
struct Entries {
    available: IndexMap<String, RegisteredTool>,
    active: IndexSet<String>,
}

/// Registry for managing tools.
pub struct ToolRegistry {
    entries: RwLock<Entries>,
    started: AtomicBool,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Register a tool, replacing any tool of the same name.
    ///
    /// The name keeps its activation state. If it is active and the
    /// registry is started, the replaced tool is stopped and the new one
    /// started.
    pub async fn add_tool(&self, ctx: &Registry, tool: RegisteredTool) -> Result<()> {
        let name = tool.name.clone();
        let (previous, running) = {
            let mut entries = self.entries.write();
            let previous = entries.available.insert(name.clone(), tool.clone());
            (previous, entries.active.contains(&name) && self.is_started())
        };
        debug!(tool = %name, package = tool.package_name(), "Tool registered");

        if running {
            if let Some(lifecycle) = previous.and_then(|p| p.definition.lifecycle) {
                lifecycle.stop(ctx).await?;
            }
            if let Some(lifecycle) = &tool.definition.lifecycle {
                lifecycle.start(ctx).await?;
            }
        }
        Ok(())
    }

    /// Unregister a tool, disabling it first. Returns whether it existed.
    pub async fn remove_tool(&self, ctx: &Registry, name: &str) -> Result<bool> {
        self.deactivate(ctx, name).await?;
        let removed = self.entries.write().available.shift_remove(name).is_some();
        if removed {
            debug!(tool = name, "Tool removed");
        }
        Ok(removed)
    }

    /// Enable tools by exact name. Unknown names fail.
    pub async fn enable_tools<S>(&self, ctx: &Registry, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(RegistryError::not_found(EntryKind::Tool, name));
            }
            self.activate(ctx, name).await?;
        }
        Ok(())
    }

    /// Disable tools by exact name. Fails on `"root"` and unknown names.
    pub async fn disable_tools<S>(&self, ctx: &Registry, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        for name in names {
            let name = name.as_ref();
            if is_protected(name) {
                return Err(RegistryError::protected(EntryKind::Tool, name));
            }
            if !self.contains(name) {
                return Err(RegistryError::not_found(EntryKind::Tool, name));
            }
            self.deactivate(ctx, name).await?;
        }
        Ok(())
    }

    /// Make the enabled set equal to `names`. Tools already enabled are
    /// left running.
    pub async fn set_enabled_tools<S>(&self, ctx: &Registry, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        let requested: IndexSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        let dropped: Vec<String> = self
            .get_enabled_tool_names()
            .into_iter()
            .filter(|n| !requested.contains(n.as_str()))
            .collect();

        self.disable_tools(ctx, &dropped).await?;
        for name in requested {
            if !self.is_enabled(name) {
                self.enable_tools(ctx, &[name]).await?;
            }
        }
        Ok(())
    }

    /// Run an enabled tool.
    pub async fn execute_tool(
        &self,
        ctx: &Registry,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ToolOutput> {
        let tool = self
            .get_tool_by_name(name)
            .ok_or_else(|| RegistryError::not_found(EntryKind::Tool, name))?;
        if !self.is_enabled(name) {
            return Err(RegistryError::NotEnabled {
                kind: EntryKind::Tool,
                name: name.to_string(),
            });
        }
        debug!(tool = name, "Executing tool");
        tool.execute(input, ctx).await
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.read().active.contains(name)
    }

    pub fn get_available_tool_names(&self) -> Vec<String> {
        self.entries.read().available.keys().cloned().collect()
    }

    pub fn get_enabled_tool_names(&self) -> Vec<String> {
        self.entries.read().active.iter().cloned().collect()
    }

    /// Tools of every enabled name, in enable order.
    pub fn get_active_tools(&self) -> Vec<RegisteredTool> {
        let entries = self.entries.read();
        entries
            .active
            .iter()
            .filter_map(|name| entries.available.get(name))
            .cloned()
            .collect()
    }

    pub fn get_tool_by_name(&self, name: &str) -> Option<RegisteredTool> {
        self.entries.read().available.get(name).cloned()
    }

    /// Tool names grouped by owning package, each list sorted.
    pub fn get_tools_by_package(&self) -> BTreeMap<String, Vec<String>> {
        let mut by_package: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, tool) in self.entries.read().available.iter() {
            by_package
                .entry(tool.package_name().to_string())
                .or_default()
                .push(name.clone());
        }
        for names in by_package.values_mut() {
            names.sort();
        }
        by_package
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.read().available.contains_key(name)
    }

    async fn activate(&self, ctx: &Registry, name: &str) -> Result<()> {
        let lifecycle = {
            let mut entries = self.entries.write();
            let Some(tool) = entries.available.get(name) else {
                return Ok(());
            };
            let lifecycle = tool.definition.lifecycle.clone();
            if !entries.active.insert(name.to_string()) {
                return Ok(());
            }
            lifecycle
        };
        debug!(tool = name, "Tool enabled");

        if self.is_started() {
            if let Some(lifecycle) = lifecycle {
                lifecycle.start(ctx).await?;
            }
        }
        Ok(())
    }

    async fn deactivate(&self, ctx: &Registry, name: &str) -> Result<()> {
        let lifecycle = {
            let mut entries = self.entries.write();
            if !entries.active.shift_remove(name) {
                return Ok(());
            }
            entries
                .available
                .get(name)
                .and_then(|t| t.definition.lifecycle.clone())
        };
        debug!(tool = name, "Tool disabled");

        if self.is_started() {
            if let Some(lifecycle) = lifecycle {
                lifecycle.stop(ctx).await?;
            }
        }
        Ok(())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capability for ToolRegistry {
    fn name(&self) -> &str {
        "ToolRegistry"
    }

    fn description(&self) -> &str {
        "Provides a registry of tools"
    }

    /// Run the start callback of every enabled tool.
    async fn start(&self, ctx: &Registry) -> Result<()> {
        self.started.store(true, Ordering::SeqCst);
        for tool in self.get_active_tools() {
            if let Some(lifecycle) = &tool.definition.lifecycle {
                debug!(tool = %tool.name, "Starting tool");
                lifecycle.start(ctx).await?;
            }
        }
        Ok(())
    }

    /// Run the stop callback of every enabled tool. Tools stay enabled.
    async fn stop(&self, ctx: &Registry) -> Result<()> {
        self.started.store(false, Ordering::SeqCst);
        for tool in self.get_active_tools() {
            if let Some(lifecycle) = &tool.definition.lifecycle {
                debug!(tool = %tool.name, "Stopping tool");
                lifecycle.stop(ctx).await?;
            }
        }
        Ok(())
    }

    async fn status(&self, _ctx: &Registry) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "available": self.get_available_tool_names(),
            "enabled": self.get_enabled_tool_names(),
        }))
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
