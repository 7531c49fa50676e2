//! Hook events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Events that can trigger hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    BeforeChatCompletion,
    AfterChatCompletion,
}

impl HookEvent {
    pub const ALL: [HookEvent; 2] = [Self::BeforeChatCompletion, Self::AfterChatCompletion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeChatCompletion => "beforeChatCompletion",
            Self::AfterChatCompletion => "afterChatCompletion",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
