// ABOUTME: Bot session owning the transcript manager and presence drafts over one store
// ABOUTME: Constructed once at startup and shared with every handler through an Arc

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{Config, ConversationConfig};
use crate::conversation::ConversationManager;
use crate::draft::DraftManager;
use crate::provider::{CompletionProvider, OpenAiCompatibleProvider};
use crate::store::{KeyValueStore, SqliteStore};

/// Everything the handlers share: one store, with a write guard per logical key
pub struct Session {
    conversation: ConversationManager,
    drafts: DraftManager,
}

impl Session {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn CompletionProvider>,
        settings: &ConversationConfig,
    ) -> Self {
        let mut conversation = ConversationManager::new(Arc::clone(&store), provider)
            .with_history_window(settings.history_window);
        if let Some(fallback) = settings.fallback_personality.as_deref() {
            conversation = conversation.with_fallback_personality(fallback);
        }

        Self {
            drafts: DraftManager::new(store),
            conversation,
        }
    }

    /// Open the on-disk store and completion client described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = SqliteStore::open(&config.storage.path)
            .with_context(|| format!("Failed to open store at {}", config.storage.path))?;
        let provider = OpenAiCompatibleProvider::from_config(&config.completion);

        tracing::info!(
            path = %config.storage.path,
            model = %provider.model(),
            "Session initialized"
        );

        Ok(Self::new(
            Arc::new(store),
            Arc::new(provider),
            &config.conversation,
        ))
    }

    pub fn conversation(&self) -> &ConversationManager {
        &self.conversation
    }

    pub fn drafts(&self) -> &DraftManager {
        &self.drafts
    }
}
