// ABOUTME: Core traits and shared types at the chat-platform seam
// ABOUTME: Presence publishing and the slash commands a platform must register

use anyhow::Result;
use async_trait::async_trait;

use crate::presence::PresenceDraft;

/// Gateway primitive that replaces the bot's live presence.
///
/// Implementations submit the draft as-is (custom status first, see
/// `PresenceDraft::publish_order`) and report transport failures as errors.
#[async_trait]
pub trait PresencePublisher: Send + Sync {
    async fn update_presence(&self, draft: &PresenceDraft) -> Result<()>;
}

/// Definition of a slash command the platform registers on startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommandDef {
    /// Command name without the leading slash (e.g., "config")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

pub const CONFIG_COMMAND: &str = "config";
pub const PERSONALITY_COMMAND: &str = "personality";

/// Commands every platform adapter registers
pub fn registered_commands() -> Vec<SlashCommandDef> {
    vec![
        SlashCommandDef {
            name: CONFIG_COMMAND,
            description: "Open the presence configuration menu",
        },
        SlashCommandDef {
            name: PERSONALITY_COMMAND,
            description: "Edit the AI personality (system prompt)",
        },
    ]
}
