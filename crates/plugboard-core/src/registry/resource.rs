//! Resource registry.
//!
//! Each resource name maps to an ordered set of instances. A name is
//! either available or active; activating it starts every instance, but
//! only while the registry itself is started. Activations made before
//! `start` are deferred until then, and `stop` keeps the active set so a
//! later `start` resumes it.
//!
//! Names ending in `*` are prefix wildcards for enable and disable. The
//! name `"root"` can never be deactivated.

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use plugboard_protocols::{EntryKind, RegistryError, Result, is_protected, wildcard_prefix};

use crate::capability::{Resource, ResourceHandle};
use crate::root::Registry;

#[derive(Default)]
struct Entries {
    available: IndexMap<String, Vec<ResourceHandle>>,
    active: IndexSet<String>,
}

/// Registry for managing named resources.
pub struct ResourceRegistry {
    entries: RwLock<Entries>,
    started: AtomicBool,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Start the instances of every active name.
    pub async fn start(&self, ctx: &Registry) -> Result<()> {
        self.started.store(true, Ordering::SeqCst);
        for name in self.get_enabled_resource_names() {
            debug!(resource = %name, "Starting resource");
            for instance in self.get_resources(&name) {
                instance.get().start(ctx).await?;
            }
        }
        Ok(())
    }

    /// Stop the instances of every active name. The names stay active.
    pub async fn stop(&self, ctx: &Registry) -> Result<()> {
        self.started.store(false, Ordering::SeqCst);
        for name in self.get_enabled_resource_names() {
            debug!(resource = %name, "Stopping resource");
            for instance in self.get_resources(&name) {
                instance.get().stop(ctx).await?;
            }
        }
        Ok(())
    }

    /// Add instances under `name`. Instances already present are skipped.
    ///
    /// Adding does not activate the name. If the name is already active
    /// and the registry is started, the new instances are started.
    pub async fn add_resource<I>(&self, ctx: &Registry, name: &str, instances: I) -> Result<()>
    where
        I: IntoIterator<Item = ResourceHandle>,
    {
        let (added, running) = {
            let mut entries = self.entries.write();
            let set = entries.available.entry(name.to_string()).or_default();
            let mut added = Vec::new();
            for instance in instances {
                if !set.iter().any(|r| r.ptr_eq(&instance)) {
                    set.push(instance.clone());
                    added.push(instance);
                }
            }
            (added, entries.active.contains(name) && self.is_started())
        };
        debug!(resource = name, count = added.len(), "Resource instances added");

        if running {
            for instance in &added {
                instance.get().start(ctx).await?;
            }
        }
        Ok(())
    }

    /// Remove `name` and all its instances, deactivating it first.
    /// Returns whether the name was known.
    pub async fn remove_resource(&self, ctx: &Registry, name: &str) -> Result<bool> {
        if self.is_enabled(name) {
            if is_protected(name) {
                return Err(RegistryError::protected(EntryKind::Resource, name));
            }
            self.deactivate(ctx, name).await?;
        }
        let removed = self.entries.write().available.shift_remove(name).is_some();
        if removed {
            debug!(resource = name, "Resource removed");
        }
        Ok(removed)
    }

    /// Activate resources by name or prefix wildcard.
    ///
    /// Unknown exact names are ignored and never become active.
    pub async fn enable_resources<S>(&self, ctx: &Registry, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        for name in names {
            let name = name.as_ref();
            let targets: Vec<String> = {
                let entries = self.entries.read();
                match wildcard_prefix(name) {
                    Some(prefix) => entries
                        .available
                        .keys()
                        .filter(|n| n.starts_with(prefix) && !entries.active.contains(*n))
                        .cloned()
                        .collect(),
                    None => {
                        if !entries.available.contains_key(name) {
                            warn!(resource = name, "Ignoring unknown resource");
                        }
                        vec![name.to_string()]
                    }
                }
            };

            for target in targets {
                self.activate(ctx, &target).await?;
            }
        }
        Ok(())
    }

    /// Deactivate resources by name or prefix wildcard.
    ///
    /// Fails on the exact name `"root"`; wildcards skip it.
    pub async fn disable_resources<S>(&self, ctx: &Registry, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        for name in names {
            let name = name.as_ref();
            let targets: Vec<String> = match wildcard_prefix(name) {
                Some(prefix) => self
                    .entries
                    .read()
                    .active
                    .iter()
                    .filter(|n| n.starts_with(prefix) && !is_protected(n))
                    .cloned()
                    .collect(),
                None if is_protected(name) => {
                    return Err(RegistryError::protected(EntryKind::Resource, name));
                }
                None => vec![name.to_string()],
            };

            for target in targets {
                self.deactivate(ctx, &target).await?;
            }
        }
        Ok(())
    }

    /// Make the active set equal to `names`, compared as exact names.
    ///
    /// Names already active are left running.
    pub async fn set_enabled_resources<S>(&self, ctx: &Registry, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        let requested: IndexSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        let dropped: Vec<String> = self
            .get_enabled_resource_names()
            .into_iter()
            .filter(|n| !requested.contains(n.as_str()))
            .collect();

        if let Some(name) = dropped.iter().find(|n| is_protected(n)) {
            return Err(RegistryError::protected(EntryKind::Resource, name.as_str()));
        }

        for name in &dropped {
            self.deactivate(ctx, name).await?;
        }
        for name in requested {
            self.activate(ctx, name).await?;
        }
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.read().active.contains(name)
    }

    pub fn get_available_resource_names(&self) -> Vec<String> {
        self.entries.read().available.keys().cloned().collect()
    }

    pub fn get_enabled_resource_names(&self) -> Vec<String> {
        self.entries.read().active.iter().cloned().collect()
    }

    /// Instances registered under `name`, active or not.
    pub fn get_resources(&self, name: &str) -> Vec<ResourceHandle> {
        self.entries
            .read()
            .available
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Instances of every active name, in activation order.
    pub fn get_active_resources(&self) -> Vec<ResourceHandle> {
        let entries = self.entries.read();
        entries
            .active
            .iter()
            .filter_map(|name| entries.available.get(name))
            .flatten()
            .cloned()
            .collect()
    }

    /// Active instances of type `T`.
    pub fn get_resources_by_type<T: Resource>(&self) -> Vec<Arc<T>> {
        self.get_active_resources()
            .iter()
            .filter_map(|r| r.downcast::<T>())
            .collect()
    }

    pub fn get_first_resource_by_type<T: Resource>(&self) -> Option<Arc<T>> {
        self.get_active_resources()
            .iter()
            .find_map(|r| r.downcast::<T>())
    }

    async fn activate(&self, ctx: &Registry, name: &str) -> Result<()> {
        let instances = {
            let mut entries = self.entries.write();
            let Some(instances) = entries.available.get(name).cloned() else {
                return Ok(());
            };
            if !entries.active.insert(name.to_string()) {
                return Ok(());
            }
            instances
        };
        debug!(resource = name, "Resource enabled");

        if self.is_started() {
            for instance in &instances {
                instance.get().start(ctx).await?;
            }
        }
        Ok(())
    }

    async fn deactivate(&self, ctx: &Registry, name: &str) -> Result<()> {
        let instances = {
            let mut entries = self.entries.write();
            if !entries.active.shift_remove(name) {
                return Ok(());
            }
            entries.available.get(name).cloned().unwrap_or_default()
        };
        debug!(resource = name, "Resource disabled");

        if self.is_started() {
            for instance in &instances {
                instance.get().stop(ctx).await?;
            }
        }
        Ok(())
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
