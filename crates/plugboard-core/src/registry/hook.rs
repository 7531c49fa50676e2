//! Hook registry.

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use plugboard_protocols::{EntryKind, HookEvent, RegistryError, Result};

use crate::capability::Capability;
use crate::hook::HookConfig;
use crate::root::Registry;

#[derive(Default)]
struct Entries {
    hooks: IndexMap<String, HookConfig>,
    enabled: IndexSet<String>,
}

/// Registry for managing hooks. Hooks have no lifecycle of their own;
/// enabling one only makes it eligible to run.
pub struct HookRegistry {
    entries: RwLock<Entries>,
    started: AtomicBool,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Register a hook, replacing any hook of the same name.
    pub fn register_hook(&self, config: HookConfig) {
        debug!(hook = %config.name, package = %config.package_name, "Hook registered");
        self.entries.write().hooks.insert(config.name.clone(), config);
    }

    /// Unregister a hook, disabling it first. Returns whether it existed.
    pub fn unregister_hook(&self, name: &str) -> bool {
        let mut entries = self.entries.write();
        entries.enabled.shift_remove(name);
        entries.hooks.shift_remove(name).is_some()
    }

    pub fn enable_hook(&self, name: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if !entries.hooks.contains_key(name) {
            return Err(RegistryError::not_found(EntryKind::Hook, name));
        }
        if entries.enabled.insert(name.to_string()) {
            debug!(hook = name, "Hook enabled");
        }
        Ok(())
    }

    pub fn disable_hook(&self, name: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if !entries.hooks.contains_key(name) {
            return Err(RegistryError::not_found(EntryKind::Hook, name));
        }
        if entries.enabled.shift_remove(name) {
            debug!(hook = name, "Hook disabled");
        }
        Ok(())
    }

    pub fn is_hook_enabled(&self, name: &str) -> bool {
        self.entries.read().enabled.contains(name)
    }

    /// Enabled hooks, in enable order.
    pub fn get_enabled_hooks(&self) -> Vec<HookConfig> {
        let entries = self.entries.read();
        entries
            .enabled
            .iter()
            .filter_map(|name| entries.hooks.get(name))
            .cloned()
            .collect()
    }

    pub fn get_registered_hooks(&self) -> Vec<HookConfig> {
        self.entries.read().hooks.values().cloned().collect()
    }

    /// Invoke the `event` callback of every enabled hook, one at a time.
    /// Hooks without a callback for `event` are skipped; the first
    /// failure stops the run.
    pub async fn execute_hooks(
        &self,
        ctx: &Registry,
        event: HookEvent,
        args: &[serde_json::Value],
    ) -> Result<()> {
        for hook in self.get_enabled_hooks() {
            if let Some(callback) = hook.definition.callback(event) {
                debug!(hook = %hook.name, %event, "Running hook");
                callback.call(ctx, args).await?;
            }
        }
        Ok(())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capability for HookRegistry {
    fn name(&self) -> &str {
        "HookRegistry"
    }

    fn description(&self) -> &str {
        "Provides a registry of hooks"
    }

    async fn start(&self, _ctx: &Registry) -> Result<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}
