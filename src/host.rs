//! Host-side glue: applying configured activation lists and dispatching
//! chat command lines.

use futures::StreamExt;
use serde_json::json;
use tracing::{debug, info};

use plugboard_config::Config;
use plugboard_core::Registry;
use plugboard_protocols::{EntryKind, HookEvent, RegistryError, Result};

/// Enables the resources, tools and hooks named in `config`.
pub(crate) async fn apply_activation(registry: &Registry, config: &Config) -> Result<()> {
    registry
        .resources()
        .enable_resources(registry, &config.resources.enabled)
        .await?;
    registry
        .tools()
        .enable_tools(registry, &config.tools.enabled)
        .await?;
    for name in &config.hooks.enabled {
        registry.hooks().enable_hook(name)?;
    }

    info!(
        resources = ?registry.resources().get_enabled_resource_names(),
        tools = ?registry.tools().get_enabled_tool_names(),
        "Activation applied"
    );
    Ok(())
}

/// Splits `"/name rest of line"` into the command name and remainder.
pub(crate) fn parse_command_line(line: &str) -> (&str, &str) {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    match line.split_once(char::is_whitespace) {
        Some((name, remainder)) => (name, remainder.trim_start()),
        None => (line, ""),
    }
}

/// Runs a chat command line, with the chat completion hooks around it.
pub(crate) async fn run_chat_command(registry: &Registry, line: &str) -> Result<Option<String>> {
    let (name, remainder) = parse_command_line(line);
    let command = registry
        .chat_commands()
        .get_command(name)
        .ok_or_else(|| RegistryError::not_found(EntryKind::ChatCommand, name))?;

    debug!(command = name, "Running chat command");
    registry
        .execute_hooks(HookEvent::BeforeChatCompletion, &[json!(line)])
        .await?;
    let reply = command.execute(remainder, registry).await?;
    registry
        .execute_hooks(HookEvent::AfterChatCompletion, &[json!(line), json!(reply)])
        .await?;
    Ok(reply)
}

/// Prints the memories and attention items every service currently holds.
pub(crate) async fn print_context(registry: &Registry) {
    let mut memories = registry.get_memories();
    while let Some(item) = memories.next().await {
        println!("[memory:{}] {}", item.role, item.content);
    }

    let mut attention = registry.get_attention_items();
    while let Some(item) = attention.next().await {
        println!("[attention:{}] {}", item.role, item.content);
    }
}

/// Prints packages, tools by package, chat commands and hooks.
pub(crate) fn print_listing(registry: &Registry) {
    println!("Packages:");
    for package in registry.get_packages() {
        println!("  {} v{} - {}", package.name, package.version, package.description);
    }

    println!("Tools:");
    for (package, tools) in registry.tools().get_tools_by_package() {
        println!("  {}: {}", package, tools.join(", "));
    }

    println!("Chat commands:");
    for (name, command) in registry.chat_commands().get_commands() {
        println!("  /{} - {}", name, command.description());
    }

    println!("Hooks:");
    for hook in registry.hooks().get_registered_hooks() {
        println!("  {} ({}) - {}", hook.name, hook.package_name, hook.description());
    }
}
