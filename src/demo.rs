//! Built-in `core` package installed by the reference host.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::json;
use tracing::info;

use plugboard_core::{
    BasicResource, Capability, ChatCommand, HookCallback, HookDefinition, Lifecycle, Package,
    Registry, ResourceHandle, Service, ToolDefinition, ToolExecutor,
};
use plugboard_protocols::{
    AttentionItem, MemoryItem, PROTECTED_NAME, RegistryError, Result, ToolOutput, Version,
};

pub(crate) const PACKAGE_NAME: &str = "core";

/// Builds the `core` package.
pub(crate) fn core_package() -> Package {
    Package::new(
        PACKAGE_NAME,
        Version::new(0, 1, 0),
        "Built-in commands, tools and hooks",
    )
    .with_lifecycle(Arc::new(CoreLifecycle))
    .with_tool(
        "echo",
        ToolDefinition::new("Returns the given text", Arc::new(EchoTool)).with_input_schema(json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to echo back" }
            },
            "required": ["text"]
        })),
    )
    .with_chat_command("help", Arc::new(HelpCommand))
    .with_chat_command("echo", Arc::new(EchoCommand))
    .with_chat_command("tools", Arc::new(ToolsCommand))
    .with_hook(
        "audit",
        HookDefinition::new("Logs every chat completion")
            .before_chat_completion(Arc::new(AuditHook { phase: "before" }))
            .after_chat_completion(Arc::new(AuditHook { phase: "after" })),
    )
}

/// Registers the session service and the root resource.
struct CoreLifecycle;

#[async_trait]
impl Lifecycle for CoreLifecycle {
    async fn start(&self, ctx: &Registry) -> Result<()> {
        ctx.services().add_service(ctx, Arc::new(SessionService)).await?;

        let resources = ctx.resources();
        let root = BasicResource::new(PROTECTED_NAME).with_description("Host root context");
        resources
            .add_resource(ctx, PROTECTED_NAME, [ResourceHandle::new(Arc::new(root))])
            .await?;
        resources.enable_resources(ctx, &[PROTECTED_NAME]).await
    }
}

/// Reports what the registry currently holds.
pub(crate) struct SessionService;

impl Capability for SessionService {
    fn name(&self) -> &str {
        "session"
    }

    fn description(&self) -> &str {
        "Summarises the running registry"
    }
}

impl Service for SessionService {
    fn memories<'a>(self: Arc<Self>, ctx: &'a Registry) -> BoxStream<'a, MemoryItem> {
        stream::once(async move {
            MemoryItem::user(format!(
                "Installed packages: {}",
                ctx.get_package_names().join(", ")
            ))
        })
        .boxed()
    }

    fn attention_items<'a>(self: Arc<Self>, ctx: &'a Registry) -> BoxStream<'a, AttentionItem> {
        let items = if ctx.tools().get_enabled_tool_names().is_empty() {
            vec![AttentionItem::user("No tools are enabled")]
        } else {
            Vec::new()
        };
        stream::iter(items).boxed()
    }
}

struct EchoTool;

#[async_trait]
impl ToolExecutor for EchoTool {
    async fn execute(&self, input: serde_json::Value, _ctx: &Registry) -> Result<ToolOutput> {
        let text = input
            .get("text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| RegistryError::InvalidInput("echo: text is required".to_string()))?;
        Ok(ToolOutput::text(text))
    }
}

struct HelpCommand;

#[async_trait]
impl ChatCommand for HelpCommand {
    fn description(&self) -> &str {
        "List available chat commands"
    }

    async fn execute(&self, _remainder: &str, ctx: &Registry) -> Result<Option<String>> {
        let lines: Vec<String> = ctx
            .chat_commands()
            .get_commands()
            .iter()
            .map(|(name, command)| format!("/{:<8} {}", name, command.description()))
            .collect();
        Ok(Some(lines.join("\n")))
    }

    fn help(&self) -> String {
        "/help - list available chat commands".to_string()
    }
}

/// Runs the `echo` tool, so the tool must be enabled.
struct EchoCommand;

#[async_trait]
impl ChatCommand for EchoCommand {
    fn description(&self) -> &str {
        "Echo text through the echo tool"
    }

    async fn execute(&self, remainder: &str, ctx: &Registry) -> Result<Option<String>> {
        let output = ctx
            .tools()
            .execute_tool(ctx, "echo", json!({ "text": remainder }))
            .await?;
        Ok(Some(output.to_content()))
    }

    fn help(&self) -> String {
        "/echo <text> - echo text through the echo tool".to_string()
    }
}

struct ToolsCommand;

#[async_trait]
impl ChatCommand for ToolsCommand {
    fn description(&self) -> &str {
        "Show enabled tools"
    }

    async fn execute(&self, _remainder: &str, ctx: &Registry) -> Result<Option<String>> {
        let enabled = ctx.tools().get_enabled_tool_names();
        if enabled.is_empty() {
            return Ok(Some("No tools enabled".to_string()));
        }
        Ok(Some(enabled.join("\n")))
    }

    fn help(&self) -> String {
        "/tools - show enabled tools".to_string()
    }
}

struct AuditHook {
    phase: &'static str,
}

#[async_trait]
impl HookCallback for AuditHook {
    async fn call(&self, _ctx: &Registry, args: &[serde_json::Value]) -> Result<()> {
        info!(phase = self.phase, args = %serde_json::Value::from(args.to_vec()), "Chat completion");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_registers_session_and_root() {
        let registry = Registry::new();
        registry.add_packages([core_package()]).await.unwrap();
        registry.start().await.unwrap();

        assert!(registry.get_first_service_by_type::<SessionService>().is_some());
        assert!(registry.resources().is_enabled(PROTECTED_NAME));
        assert!(registry
            .resources()
            .disable_resources(&registry, &[PROTECTED_NAME])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_echo_command_needs_enabled_tool() {
        let registry = Registry::new();
        registry.add_packages([core_package()]).await.unwrap();
        registry.start().await.unwrap();

        let echo = registry.chat_commands().get_command("echo").unwrap();
        assert!(echo.execute("hi", &registry).await.is_err());

        registry.tools().enable_tools(&registry, &["echo"]).await.unwrap();
        let reply = echo.execute("hi", &registry).await.unwrap();
        assert_eq!(reply.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let registry = Registry::new();
        registry.add_packages([core_package()]).await.unwrap();

        let help = registry.chat_commands().get_command("help").unwrap();
        let reply = help.execute("", &registry).await.unwrap().unwrap();
        assert!(reply.contains("/help"));
        assert!(reply.contains("/echo"));
        assert!(reply.contains("/tools"));
    }

    #[tokio::test]
    async fn test_session_attention_when_no_tools() {
        let registry = Registry::new();
        registry.add_packages([core_package()]).await.unwrap();
        registry.start().await.unwrap();

        let items: Vec<_> = registry.get_attention_items().collect().await;
        assert_eq!(items.len(), 1);

        registry.tools().enable_tools(&registry, &["echo"]).await.unwrap();
        let items: Vec<_> = registry.get_attention_items().collect().await;
        assert!(items.is_empty());

        let memories: Vec<_> = registry.get_memories().collect().await;
        assert_eq!(memories[0].content, "Installed packages: core");
    }
}
