// ABOUTME: Platform abstraction module for vanir
// ABOUTME: Re-exports platform implementations (Discord)

#[cfg(feature = "discord")]
pub mod discord;

#[cfg(feature = "discord")]
pub use discord::{DiscordPlatform, DiscordPresence};
