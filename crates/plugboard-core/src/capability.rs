//! Capability base: the contract shared by services and resources.
//!
//! A capability has an identity (name, description) and an optional
//! three-phase lifecycle. Every phase receives the root [`Registry`] as
//! context. Services can additionally produce lazy streams of memories and
//! attention items.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use plugboard_protocols::{AttentionItem, MemoryItem, RegistryError, Result};

use crate::root::Registry;

/// Core trait for anything a registry can start and stop.
#[async_trait]
pub trait Capability: Send + Sync + 'static {
    /// Returns the capability name.
    fn name(&self) -> &str;

    /// Returns a human-readable description.
    fn description(&self) -> &str {
        ""
    }

    async fn start(&self, _ctx: &Registry) -> Result<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        Ok(())
    }

    /// Reports runtime status.
    ///
    /// Fails with [`RegistryError::Unimplemented`] unless overridden; callers
    /// should read that variant as "not supported".
    async fn status(&self, _ctx: &Registry) -> Result<serde_json::Value> {
        Err(RegistryError::Unimplemented(self.name().to_string()))
    }
}

/// A long-lived capability that is started as soon as it is registered.
///
/// Both producers return a fresh, finite stream on every call.
pub trait Service: Capability {
    fn memories<'a>(self: Arc<Self>, _ctx: &'a Registry) -> BoxStream<'a, MemoryItem> {
        stream::empty().boxed()
    }

    fn attention_items<'a>(self: Arc<Self>, _ctx: &'a Registry) -> BoxStream<'a, AttentionItem> {
        stream::empty().boxed()
    }
}

/// A capability that only runs while its name is enabled.
pub trait Resource: Capability {}

/// A registered capability together with the type information needed for
/// typed lookup.
///
/// The type-erased pointer is captured when the handle is built from a
/// concrete `Arc<T>`, so lookups compare against the real type rather than
/// probing the trait object.
pub struct CapabilityHandle<C: ?Sized> {
    capability: Arc<C>,
    erased: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

pub type ServiceHandle = CapabilityHandle<dyn Service>;
pub type ResourceHandle = CapabilityHandle<dyn Resource>;

impl<C: ?Sized> CapabilityHandle<C> {
    pub fn get(&self) -> &Arc<C> {
        &self.capability
    }

    /// Name of the concrete type behind the handle.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.erased.is::<T>()
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.erased).downcast::<T>().ok()
    }

    /// True if both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.erased), Arc::as_ptr(&other.erased))
    }
}

impl<C: Capability + ?Sized> CapabilityHandle<C> {
    pub fn name(&self) -> &str {
        self.capability.name()
    }
}

impl CapabilityHandle<dyn Service> {
    pub fn new<S: Service>(service: Arc<S>) -> Self {
        Self {
            erased: service.clone(),
            capability: service,
            type_name: std::any::type_name::<S>(),
        }
    }
}

impl CapabilityHandle<dyn Resource> {
    pub fn new<R: Resource>(resource: Arc<R>) -> Self {
        Self {
            erased: resource.clone(),
            capability: resource,
            type_name: std::any::type_name::<R>(),
        }
    }
}

impl<S: Service> From<Arc<S>> for CapabilityHandle<dyn Service> {
    fn from(service: Arc<S>) -> Self {
        Self::new(service)
    }
}

impl<R: Resource> From<Arc<R>> for CapabilityHandle<dyn Resource> {
    fn from(resource: Arc<R>) -> Self {
        Self::new(resource)
    }
}

impl<C: ?Sized> Clone for CapabilityHandle<C> {
    fn clone(&self) -> Self {
        Self {
            capability: Arc::clone(&self.capability),
            erased: Arc::clone(&self.erased),
            type_name: self.type_name,
        }
    }
}

impl<C: Capability + ?Sized> fmt::Debug for CapabilityHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityHandle")
            .field("name", &self.name())
            .field("type", &self.type_name)
            .finish()
    }
}

/// A resource with identity only and no lifecycle behaviour.
#[derive(Debug, Clone, Default)]
pub struct BasicResource {
    name: String,
    description: String,
}

impl BasicResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Capability for BasicResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Resource for BasicResource {}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
