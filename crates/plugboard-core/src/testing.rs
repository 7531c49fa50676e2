//! Recording mocks shared by the registry tests.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;

use plugboard_protocols::{AttentionItem, MemoryItem, RegistryError, Result, ToolOutput};

use crate::capability::{Capability, Resource, Service};
use crate::command::ChatCommand;
use crate::hook::HookCallback;
use crate::lifecycle::Lifecycle;
use crate::root::Registry;
use crate::tool::{ToolDefinition, ToolExecutor};

/// Ordered log of lifecycle calls, shared between mocks.
#[derive(Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == event).count()
    }

    pub(crate) fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == event)
    }
}

pub(crate) struct RecordingService {
    pub(crate) name: String,
    pub(crate) log: EventLog,
    pub(crate) memories: Vec<&'static str>,
    pub(crate) fail_start: bool,
}

impl RecordingService {
    pub(crate) fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            memories: Vec::new(),
            fail_start: false,
        }
    }

    pub(crate) fn with_memories(mut self, memories: &[&'static str]) -> Self {
        self.memories = memories.to_vec();
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

#[async_trait]
impl Capability for RecordingService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _ctx: &Registry) -> Result<()> {
        if self.fail_start {
            return Err(RegistryError::StartFailed {
                name: self.name.clone(),
                message: "boom".to_string(),
            });
        }
        self.log.push(format!("start:{}", self.name));
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        self.log.push(format!("stop:{}", self.name));
        Ok(())
    }
}

impl Service for RecordingService {
    fn memories<'a>(self: Arc<Self>, _ctx: &'a Registry) -> BoxStream<'a, MemoryItem> {
        let items: Vec<MemoryItem> = self
            .memories
            .iter()
            .map(|m| MemoryItem::user(format!("{}:{}", self.name, m)))
            .collect();
        stream::iter(items).boxed()
    }

    fn attention_items<'a>(self: Arc<Self>, _ctx: &'a Registry) -> BoxStream<'a, AttentionItem> {
        stream::once(async move { AttentionItem::user(format!("{} needs attention", self.name)) })
            .boxed()
    }
}

/// A second service type, for typed lookups.
pub(crate) struct OtherService {
    pub(crate) name: String,
}

impl OtherService {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Capability for OtherService {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Service for OtherService {}

pub(crate) struct RecordingResource {
    pub(crate) label: String,
    pub(crate) log: EventLog,
}

impl RecordingResource {
    pub(crate) fn new(label: &str, log: &EventLog) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl Capability for RecordingResource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn start(&self, _ctx: &Registry) -> Result<()> {
        self.log.push(format!("start:{}", self.label));
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        self.log.push(format!("stop:{}", self.label));
        Ok(())
    }
}

impl Resource for RecordingResource {}

/// Lifecycle callbacks for packages and tools.
pub(crate) struct RecordingLifecycle {
    pub(crate) label: String,
    pub(crate) log: EventLog,
}

impl RecordingLifecycle {
    pub(crate) fn new(label: &str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Lifecycle for RecordingLifecycle {
    async fn start(&self, _ctx: &Registry) -> Result<()> {
        self.log.push(format!("start:{}", self.label));
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        self.log.push(format!("stop:{}", self.label));
        Ok(())
    }
}

pub(crate) struct StaticExecutor(pub(crate) &'static str);

#[async_trait]
impl ToolExecutor for StaticExecutor {
    async fn execute(&self, _input: serde_json::Value, _ctx: &Registry) -> Result<ToolOutput> {
        Ok(ToolOutput::text(self.0))
    }
}

/// A tool definition whose lifecycle records into `log` as `start:<label>`.
pub(crate) fn recording_tool(label: &str, log: &EventLog) -> ToolDefinition {
    ToolDefinition::new(format!("Tool {label}"), Arc::new(StaticExecutor("ok")))
        .with_lifecycle(RecordingLifecycle::new(label, log))
}

pub(crate) struct RecordingHook {
    pub(crate) label: String,
    pub(crate) log: EventLog,
}

impl RecordingHook {
    pub(crate) fn new(label: &str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl HookCallback for RecordingHook {
    async fn call(&self, _ctx: &Registry, args: &[serde_json::Value]) -> Result<()> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.log.push(format!("{}({})", self.label, args.join(",")));
        Ok(())
    }
}

pub(crate) struct EchoCommand;

#[async_trait]
impl ChatCommand for EchoCommand {
    fn description(&self) -> &str {
        "Echo the remainder"
    }

    async fn execute(&self, remainder: &str, _ctx: &Registry) -> Result<Option<String>> {
        Ok(Some(remainder.to_string()))
    }

    fn help(&self) -> String {
        "/echo <text>".to_string()
    }
}
