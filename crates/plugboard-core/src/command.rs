//! Chat command descriptors.

use async_trait::async_trait;

use plugboard_protocols::Result;

use crate::root::Registry;

/// A command a user can type into the host's chat surface.
#[async_trait]
pub trait ChatCommand: Send + Sync {
    fn description(&self) -> &str;

    /// Runs the command with the text following its name.
    async fn execute(&self, remainder: &str, ctx: &Registry) -> Result<Option<String>>;

    fn help(&self) -> String;
}
