//! The root registry.
//!
//! Holds the installed packages and one of each sub-registry, and drives
//! the shared lifecycle. Every callback into package code receives the
//! root registry as its context.

use futures::stream::BoxStream;
use parking_lot::RwLock;
use std::sync::Arc;

use tracing::{debug, error, info};

use plugboard_protocols::{AttentionItem, EntryKind, HookEvent, MemoryItem, RegistryError, Result};

use crate::capability::{Capability, Service};
use crate::hook::HookConfig;
use crate::lifecycle::{RegistryState, StateCell};
use crate::package::Package;
use crate::registry::{
    ChatCommandRegistry, HookRegistry, ResourceRegistry, ServiceRegistry, ToolRegistry,
};
use crate::tool::RegisteredTool;

/// Root registry for packages and their contributions.
pub struct Registry {
    packages: RwLock<Vec<Arc<Package>>>,
    state: StateCell,
    services: ServiceRegistry,
    resources: ResourceRegistry,
    tools: ToolRegistry,
    hooks: HookRegistry,
    chat_commands: ChatCommandRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            packages: RwLock::new(Vec::new()),
            state: StateCell::new(),
            services: ServiceRegistry::new(),
            resources: ResourceRegistry::new(),
            tools: ToolRegistry::new(),
            hooks: HookRegistry::new(),
            chat_commands: ChatCommandRegistry::new(),
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state.get()
    }

    pub fn is_started(&self) -> bool {
        self.state() == RegistryState::Running
    }

    /// Start the registry.
    ///
    /// Package start callbacks run first, one at a time in install order.
    /// Packages installed by those callbacks are started in the same pass.
    /// The four lifecycle sub-registries then start concurrently, each run
    /// to completion even when a sibling fails.
    ///
    /// On failure the registry moves to [`RegistryState::Failed`]; call
    /// [`stop`](Self::stop) before starting again.
    pub async fn start(&self) -> Result<()> {
        self.state.begin_start()?;
        info!("Registry starting...");

        match self.start_inner().await {
            Ok(()) => {
                self.state.set(RegistryState::Running);
                info!("Registry started");
                Ok(())
            }
            Err(e) => {
                error!("Registry failed to start: {}", e);
                self.state.set(RegistryState::Failed);
                Err(e)
            }
        }
    }

    async fn start_inner(&self) -> Result<()> {
        let mut index = 0;
        while let Some(package) = self.package_at(index) {
            if let Some(lifecycle) = &package.lifecycle {
                debug!(package = %package.name, "Starting package");
                lifecycle.start(self).await?;
            }
            index += 1;
        }

        let (services, resources, tools, hooks) = futures::join!(
            self.services.start(self),
            self.resources.start(self),
            Capability::start(&self.tools, self),
            Capability::start(&self.hooks, self),
        );
        services.and(resources).and(tools).and(hooks)
    }

    /// Stop the registry. Sub-registries stop concurrently, then package
    /// stop callbacks run in install order.
    ///
    /// Allowed from `Running` and from `Failed`, so whatever a failed start
    /// did bring up can be torn down.
    pub async fn stop(&self) -> Result<()> {
        self.state.begin_stop()?;
        info!("Registry stopping...");

        let result = self.stop_inner().await;
        self.state.set(RegistryState::Stopped);
        match &result {
            Ok(()) => info!("Registry stopped"),
            Err(e) => error!("Registry failed to stop cleanly: {}", e),
        }
        result
    }

    async fn stop_inner(&self) -> Result<()> {
        let (services, resources, tools, hooks) = futures::join!(
            self.services.stop(self),
            self.resources.stop(self),
            Capability::stop(&self.tools, self),
            Capability::stop(&self.hooks, self),
        );
        services.and(resources).and(tools).and(hooks)?;

        for package in self.get_packages() {
            if let Some(lifecycle) = &package.lifecycle {
                debug!(package = %package.name, "Stopping package");
                lifecycle.stop(self).await?;
            }
        }
        Ok(())
    }

    /// Install packages in order.
    ///
    /// Each package's tools, chat commands and hooks are registered under
    /// its name. If the registry is running, the package is started first.
    pub async fn add_packages<I>(&self, packages: I) -> Result<()>
    where
        I: IntoIterator<Item = Package>,
        I::IntoIter: Send,
    {
        for package in packages {
            let package = Arc::new(package);
            {
                let mut installed = self.packages.write();
                if installed.iter().any(|p| p.name == package.name) {
                    return Err(RegistryError::AlreadyRegistered {
                        kind: EntryKind::Package,
                        name: package.name.clone(),
                    });
                }
                installed.push(Arc::clone(&package));
            }
            info!("Package installed: {} v{}", package.name, package.version);

            if self.is_started() {
                if let Some(lifecycle) = &package.lifecycle {
                    lifecycle.start(self).await?;
                }
            }

            for (name, definition) in &package.tools {
                let tool = RegisteredTool::new(name, definition.clone()).with_package(&package.name);
                self.tools.add_tool(self, tool).await?;
            }
            for (name, command) in &package.chat_commands {
                self.chat_commands.add_command(name, Arc::clone(command));
            }
            for (name, definition) in &package.hooks {
                self.hooks
                    .register_hook(HookConfig::new(name, &package.name, definition.clone()));
            }
        }
        Ok(())
    }

    /// Uninstall packages by name, stopping each if the registry is running.
    ///
    /// Tools, chat commands and hooks the package contributed stay
    /// registered.
    pub async fn remove_packages<S>(&self, names: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        for name in names {
            let name = name.as_ref();
            let package = {
                let mut installed = self.packages.write();
                let position = installed
                    .iter()
                    .position(|p| p.name == name)
                    .ok_or_else(|| RegistryError::not_found(EntryKind::Package, name))?;
                installed.remove(position)
            };
            info!("Package removed: {}", name);

            if self.is_started() {
                if let Some(lifecycle) = &package.lifecycle {
                    lifecycle.stop(self).await?;
                }
            }
        }
        Ok(())
    }

    pub fn get_package_names(&self) -> Vec<String> {
        self.packages.read().iter().map(|p| p.name.clone()).collect()
    }

    pub fn get_packages(&self) -> Vec<Arc<Package>> {
        self.packages.read().clone()
    }

    pub fn get_package(&self, name: &str) -> Option<Arc<Package>> {
        self.packages.read().iter().find(|p| p.name == name).cloned()
    }

    fn package_at(&self, index: usize) -> Option<Arc<Package>> {
        self.packages.read().get(index).cloned()
    }

    pub fn get_first_service_by_type<T: Service>(&self) -> Option<Arc<T>> {
        self.services.get_first_service_by_type::<T>()
    }

    pub fn require_first_service_by_type<T: Service>(&self) -> Result<Arc<T>> {
        self.services.require_first_service_by_type::<T>()
    }

    /// Memories from every service, in registration order.
    pub fn get_memories(&self) -> BoxStream<'_, MemoryItem> {
        self.services.get_memories(self)
    }

    /// Attention items from every service, in registration order.
    pub fn get_attention_items(&self) -> BoxStream<'_, AttentionItem> {
        self.services.get_attention_items(self)
    }

    /// Run the enabled hooks for `event` with this registry as context.
    pub async fn execute_hooks(&self, event: HookEvent, args: &[serde_json::Value]) -> Result<()> {
        self.hooks.execute_hooks(self, event, args).await
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn chat_commands(&self) -> &ChatCommandRegistry {
        &self.chat_commands
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "root_tests.rs"]
mod tests;
