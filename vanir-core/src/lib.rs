// ABOUTME: Platform-agnostic session state for the vanir chat bot
// ABOUTME: Conversation transcript, presence drafts, typed forms, and event dispatch

pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod draft;
pub mod error;
pub mod forms;
pub mod paths;
pub mod presence;
pub mod provider;
pub mod session;
pub mod store;
pub mod traits;
pub mod utils;

// Re-export the types handlers work with most
pub use conversation::{ChatMessage, ConversationManager, Role};
pub use dispatch::{Dispatcher, InboundEvent, Response};
pub use draft::{DraftManager, FieldGroup, PublishOutcome};
pub use error::{BotError, CompletionError};
pub use presence::{Activity, ActivityKind, OnlineStatus, PresenceDraft};
pub use provider::{CompletionProvider, OpenAiCompatibleProvider};
pub use session::Session;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use traits::PresencePublisher;
