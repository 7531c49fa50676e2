//! Service registry.
//!
//! Services have no separate active tier: once registered they run for as
//! long as the registry is started.

use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use plugboard_protocols::{AttentionItem, EntryKind, MemoryItem, RegistryError, Result};

use crate::capability::{Service, ServiceHandle};
use crate::root::Registry;

/// Registry for managing services, in registration order.
pub struct ServiceRegistry {
    services: RwLock<Vec<ServiceHandle>>,
    started: AtomicBool,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Start every registered service, one after another.
    pub async fn start(&self, ctx: &Registry) -> Result<()> {
        self.started.store(true, Ordering::SeqCst);
        for service in self.get_services() {
            debug!(service = service.name(), "Starting service");
            service.get().start(ctx).await?;
        }
        Ok(())
    }

    /// Stop every registered service, one after another.
    pub async fn stop(&self, ctx: &Registry) -> Result<()> {
        self.started.store(false, Ordering::SeqCst);
        for service in self.get_services() {
            debug!(service = service.name(), "Stopping service");
            service.get().stop(ctx).await?;
        }
        Ok(())
    }

    /// Register services. Each is started right away if the registry is
    /// running. Services already registered are skipped.
    pub async fn add_services<I>(&self, ctx: &Registry, services: I) -> Result<()>
    where
        I: IntoIterator<Item = ServiceHandle>,
        I::IntoIter: Send,
    {
        for service in services {
            {
                let mut guard = self.services.write();
                if guard.iter().any(|s| s.ptr_eq(&service)) {
                    continue;
                }
                guard.push(service.clone());
            }
            debug!(service = service.name(), "Service registered");

            if self.is_started() {
                service.get().start(ctx).await?;
            }
        }
        Ok(())
    }

    /// Register a single service.
    pub async fn add_service<S: Service>(&self, ctx: &Registry, service: Arc<S>) -> Result<()> {
        self.add_services(ctx, [ServiceHandle::new(service)]).await
    }

    /// Unregister services, stopping each if the registry is running.
    pub async fn remove_services<I>(&self, ctx: &Registry, services: I) -> Result<()>
    where
        I: IntoIterator<Item = ServiceHandle>,
        I::IntoIter: Send,
    {
        for service in services {
            let removed = {
                let mut guard = self.services.write();
                let before = guard.len();
                guard.retain(|s| !s.ptr_eq(&service));
                guard.len() != before
            };
            if !removed {
                continue;
            }
            debug!(service = service.name(), "Service removed");

            if self.is_started() {
                service.get().stop(ctx).await?;
            }
        }
        Ok(())
    }

    pub fn get_services(&self) -> Vec<ServiceHandle> {
        self.services.read().clone()
    }

    pub fn get_service_names(&self) -> Vec<String> {
        self.services.read().iter().map(|s| s.name().to_string()).collect()
    }

    pub fn get_services_by_name(&self, name: &str) -> Vec<ServiceHandle> {
        self.services
            .read()
            .iter()
            .filter(|s| s.name() == name)
            .cloned()
            .collect()
    }

    /// All services of type `T`, in registration order.
    pub fn get_services_by_type<T: Service>(&self) -> Vec<Arc<T>> {
        self.services
            .read()
            .iter()
            .filter_map(|s| s.downcast::<T>())
            .collect()
    }

    pub fn get_first_service_by_type<T: Service>(&self) -> Option<Arc<T>> {
        self.services.read().iter().find_map(|s| s.downcast::<T>())
    }

    pub fn require_first_service_by_type<T: Service>(&self) -> Result<Arc<T>> {
        self.get_first_service_by_type::<T>()
            .ok_or_else(|| RegistryError::not_found(EntryKind::Service, std::any::type_name::<T>()))
    }

    /// The first service named `name`, which must be a `T`.
    pub fn require_service_by_name<T: Service>(&self, name: &str) -> Result<Arc<T>> {
        let handle = self
            .get_services_by_name(name)
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::not_found(EntryKind::Service, name))?;

        handle.downcast::<T>().ok_or_else(|| RegistryError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// Memories from every service, one service's stream drained before
    /// the next is pulled.
    pub fn get_memories<'a>(&self, ctx: &'a Registry) -> BoxStream<'a, MemoryItem> {
        stream::iter(self.get_services())
            .flat_map(move |s| Arc::clone(s.get()).memories(ctx))
            .boxed()
    }

    /// Attention items from every service, concatenated in registration
    /// order.
    pub fn get_attention_items<'a>(&self, ctx: &'a Registry) -> BoxStream<'a, AttentionItem> {
        stream::iter(self.get_services())
            .flat_map(move |s| Arc::clone(s.get()).attention_items(ctx))
            .boxed()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
