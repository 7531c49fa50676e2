//! End-to-end registry behaviour through the public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use plugboard_core::{
    Capability, HookCallback, HookDefinition, Lifecycle, Package, Registry, Resource,
    ResourceHandle, Service, ServiceHandle, ToolDefinition, ToolExecutor,
};
use plugboard_protocols::{HookEvent, RegistryError, Result, ToolOutput, Version};

type Log = Arc<Mutex<Vec<String>>>;

struct Counted {
    name: String,
    log: Log,
}

impl Counted {
    fn new(name: &str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: Arc::clone(log),
        })
    }
}

#[async_trait]
impl Capability for Counted {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _ctx: &Registry) -> Result<()> {
        self.log.lock().push(format!("start:{}", self.name));
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        self.log.lock().push(format!("stop:{}", self.name));
        Ok(())
    }
}

impl Service for Counted {}
impl Resource for Counted {}

struct Clock;

impl Capability for Clock {
    fn name(&self) -> &str {
        "clock"
    }
}

impl Service for Clock {}

struct PackageHooks {
    label: &'static str,
    log: Log,
}

#[async_trait]
impl Lifecycle for PackageHooks {
    async fn start(&self, _ctx: &Registry) -> Result<()> {
        self.log.lock().push(format!("start:{}", self.label));
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        self.log.lock().push(format!("stop:{}", self.label));
        Ok(())
    }
}

struct CountingTool {
    starts: AtomicUsize,
}

#[async_trait]
impl Lifecycle for CountingTool {
    async fn start(&self, _ctx: &Registry) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Upper;

#[async_trait]
impl ToolExecutor for Upper {
    async fn execute(&self, input: serde_json::Value, _ctx: &Registry) -> Result<ToolOutput> {
        let text = input["text"].as_str().unwrap_or_default();
        Ok(ToolOutput::text(text.to_uppercase()))
    }
}

struct Recorder(Log);

#[async_trait]
impl HookCallback for Recorder {
    async fn call(&self, _ctx: &Registry, args: &[serde_json::Value]) -> Result<()> {
        self.0.lock().push(format!("hook:{}", args.len()));
        Ok(())
    }
}

fn events(log: &Log) -> Vec<String> {
    log.lock().clone()
}

fn count(log: &Log, event: &str) -> usize {
    log.lock().iter().filter(|e| e.as_str() == event).count()
}

fn position(log: &Log, event: &str) -> usize {
    log.lock()
        .iter()
        .position(|e| e == event)
        .unwrap_or(usize::MAX)
}

#[tokio::test]
async fn test_package_names_in_install_order() {
    let registry = Registry::new();
    registry
        .add_packages([
            Package::new("p1", Version::new(1, 0, 0), "first"),
            Package::new("p2", Version::new(1, 0, 0), "second"),
        ])
        .await
        .unwrap();
    assert_eq!(registry.get_package_names(), vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_resource_with_two_instances_starts_each_once() {
    let log: Log = Arc::default();
    let registry = Registry::new();
    registry.start().await.unwrap();

    let resources = registry.resources();
    resources
        .add_resource(
            &registry,
            "db",
            [
                ResourceHandle::new(Counted::new("db-a", &log)),
                ResourceHandle::new(Counted::new("db-b", &log)),
            ],
        )
        .await
        .unwrap();

    resources.enable_resources(&registry, &["db"]).await.unwrap();
    resources.enable_resources(&registry, &["db"]).await.unwrap();
    assert_eq!(events(&log), vec!["start:db-a", "start:db-b"]);
}

#[tokio::test]
async fn test_wildcard_enable_is_idempotent() {
    let log: Log = Arc::default();
    let registry = Registry::new();
    registry.start().await.unwrap();

    let resources = registry.resources();
    for name in ["db1", "db2", "cache"] {
        resources
            .add_resource(&registry, name, [ResourceHandle::new(Counted::new(name, &log))])
            .await
            .unwrap();
    }

    resources.enable_resources(&registry, &["db*"]).await.unwrap();
    resources.enable_resources(&registry, &["db*"]).await.unwrap();
    assert_eq!(resources.get_enabled_resource_names(), vec!["db1", "db2"]);
    assert_eq!(count(&log, "start:db1"), 1);
    assert_eq!(count(&log, "start:db2"), 1);
}

#[tokio::test]
async fn test_root_resource_is_protected() {
    let log: Log = Arc::default();
    let registry = Registry::new();
    let resources = registry.resources();
    resources
        .add_resource(&registry, "root", [ResourceHandle::new(Counted::new("root", &log))])
        .await
        .unwrap();
    resources
        .add_resource(&registry, "rootfs", [ResourceHandle::new(Counted::new("rootfs", &log))])
        .await
        .unwrap();
    resources.enable_resources(&registry, &["root*"]).await.unwrap();

    let err = resources.disable_resources(&registry, &["root"]).await.unwrap_err();
    assert!(matches!(err, RegistryError::ProtectedName { .. }));

    resources.disable_resources(&registry, &["root*"]).await.unwrap();
    assert_eq!(resources.get_enabled_resource_names(), vec!["root"]);
}

#[tokio::test]
async fn test_unknown_names() {
    let registry = Registry::new();

    let err = registry
        .tools()
        .enable_tools(&registry, &["missing"])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }));

    registry
        .resources()
        .enable_resources(&registry, &["missing"])
        .await
        .unwrap();
    assert!(registry.resources().get_enabled_resource_names().is_empty());
}

#[tokio::test]
async fn test_first_service_by_type() {
    let log: Log = Arc::default();
    let registry = Registry::new();
    assert!(registry.require_first_service_by_type::<Clock>().is_err());

    let first = Counted::new("first", &log);
    registry
        .services()
        .add_services(
            &registry,
            [
                ServiceHandle::new(first.clone()),
                ServiceHandle::new(Arc::new(Clock)),
                ServiceHandle::new(Counted::new("second", &log)),
            ],
        )
        .await
        .unwrap();

    let found = registry.get_first_service_by_type::<Counted>().unwrap();
    assert!(Arc::ptr_eq(&found, &first));
    assert!(registry.require_first_service_by_type::<Clock>().is_ok());
}

#[tokio::test]
async fn test_set_enabled_tools_keeps_survivors_running() {
    let registry = Registry::new();
    let a = Arc::new(CountingTool {
        starts: AtomicUsize::new(0),
    });
    let pkg = Package::new("core", Version::new(1, 0, 0), "tools")
        .with_tool(
            "a",
            ToolDefinition::new("A", Arc::new(Upper)).with_lifecycle(a.clone()),
        )
        .with_tool("b", ToolDefinition::new("B", Arc::new(Upper)))
        .with_tool("c", ToolDefinition::new("C", Arc::new(Upper)));
    registry.add_packages([pkg]).await.unwrap();
    registry.start().await.unwrap();

    let tools = registry.tools();
    tools.enable_tools(&registry, &["a", "c"]).await.unwrap();
    tools.set_enabled_tools(&registry, &["a", "b"]).await.unwrap();

    let mut enabled = tools.get_enabled_tool_names();
    enabled.sort();
    assert_eq!(enabled, vec!["a", "b"]);
    assert_eq!(a.starts.load(Ordering::SeqCst), 1);

    let out = tools
        .execute_tool(&registry, "b", json!({"text": "hi"}))
        .await
        .unwrap();
    assert_eq!(out.as_text(), Some("HI"));
}

#[tokio::test]
async fn test_root_start_stop_ordering() {
    let log: Log = Arc::default();
    let registry = Registry::new();
    let pkg = Package::new("core", Version::new(1, 0, 0), "ordered").with_lifecycle(Arc::new(
        PackageHooks {
            label: "core",
            log: Arc::clone(&log),
        },
    ));
    registry.add_packages([pkg]).await.unwrap();
    registry
        .services()
        .add_service(&registry, Counted::new("svc", &log))
        .await
        .unwrap();

    registry.start().await.unwrap();
    assert_eq!(count(&log, "start:svc"), 1);
    assert_eq!(count(&log, "stop:svc"), 0);
    assert!(position(&log, "start:core") < position(&log, "start:svc"));

    registry.stop().await.unwrap();
    assert_eq!(count(&log, "stop:svc"), 1);
    assert!(position(&log, "stop:svc") < position(&log, "stop:core"));
}

#[tokio::test]
async fn test_hooks_run_around_completion() {
    let log: Log = Arc::default();
    let registry = Registry::new();
    let pkg = Package::new("core", Version::new(1, 0, 0), "hooks").with_hook(
        "audit",
        HookDefinition::new("Audits")
            .before_chat_completion(Arc::new(Recorder(Arc::clone(&log))))
            .after_chat_completion(Arc::new(Recorder(Arc::clone(&log)))),
    );
    registry.add_packages([pkg]).await.unwrap();
    registry.hooks().enable_hook("audit").unwrap();
    registry.start().await.unwrap();

    registry
        .execute_hooks(HookEvent::BeforeChatCompletion, &[json!("prompt")])
        .await
        .unwrap();
    registry
        .execute_hooks(HookEvent::AfterChatCompletion, &[json!("prompt"), json!("reply")])
        .await
        .unwrap();
    assert_eq!(events(&log), vec!["hook:1", "hook:2"]);
}
