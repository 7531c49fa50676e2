//! Hook descriptors.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use plugboard_protocols::{HookEvent, Result};

use crate::root::Registry;

/// Callback invoked when a hook event fires.
#[async_trait]
pub trait HookCallback: Send + Sync {
    async fn call(&self, ctx: &Registry, args: &[serde_json::Value]) -> Result<()>;
}

/// A hook as declared by a package. Every callback is optional.
#[derive(Clone, Default)]
pub struct HookDefinition {
    pub description: String,
    pub before_chat_completion: Option<Arc<dyn HookCallback>>,
    pub after_chat_completion: Option<Arc<dyn HookCallback>>,
}

impl HookDefinition {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn before_chat_completion(mut self, callback: Arc<dyn HookCallback>) -> Self {
        self.before_chat_completion = Some(callback);
        self
    }

    pub fn after_chat_completion(mut self, callback: Arc<dyn HookCallback>) -> Self {
        self.after_chat_completion = Some(callback);
        self
    }

    pub fn callback(&self, event: HookEvent) -> Option<&Arc<dyn HookCallback>> {
        match event {
            HookEvent::BeforeChatCompletion => self.before_chat_completion.as_ref(),
            HookEvent::AfterChatCompletion => self.after_chat_completion.as_ref(),
        }
    }

    /// Events this hook has a callback for.
    pub fn events(&self) -> Vec<HookEvent> {
        HookEvent::ALL
            .into_iter()
            .filter(|event| self.callback(*event).is_some())
            .collect()
    }
}

impl fmt::Debug for HookDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDefinition")
            .field("description", &self.description)
            .field("events", &self.events())
            .finish()
    }
}

/// A hook held by the [`HookRegistry`](crate::registry::HookRegistry).
#[derive(Debug, Clone)]
pub struct HookConfig {
    pub name: String,
    pub package_name: String,
    pub definition: HookDefinition,
}

impl HookConfig {
    pub fn new(
        name: impl Into<String>,
        package_name: impl Into<String>,
        definition: HookDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            definition,
        }
    }

    pub fn description(&self) -> &str {
        &self.definition.description
    }
}
