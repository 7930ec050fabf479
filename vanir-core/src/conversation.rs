// ABOUTME: Shared conversation transcript and personality management.
// ABOUTME: Builds completion prompts and appends each successful exchange to the store.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::CompletionError;
use crate::provider::CompletionProvider;
use crate::store::{KeyValueStore, PERSONALITY_KEY, TRANSCRIPT_KEY};

/// Personality used when none has been stored yet
pub const DEFAULT_PERSONALITY: &str = "You are a regular member of a casual Discord server named vanir. \
You talk like everyone else in the chat, use current slang, keep it short, \
and you never reply in paragraphs.";

/// Speaker of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of the prompt history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Owns the global transcript and the active personality.
///
/// Every transcript read-modify-write runs under `transcript_guard`. The
/// completion call itself runs outside it.
pub struct ConversationManager {
    store: Arc<dyn KeyValueStore>,
    provider: Arc<dyn CompletionProvider>,
    transcript_guard: Mutex<()>,
    fallback_personality: String,
    history_window: Option<usize>,
}

impl ConversationManager {
    pub fn new(store: Arc<dyn KeyValueStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            store,
            provider,
            transcript_guard: Mutex::new(()),
            fallback_personality: DEFAULT_PERSONALITY.to_string(),
            history_window: None,
        }
    }

    /// Override the personality used when nothing is stored
    pub fn with_fallback_personality(mut self, personality: impl Into<String>) -> Self {
        self.fallback_personality = personality.into();
        self
    }

    /// Only send the last `window` transcript entries to the provider.
    /// The stored transcript is never truncated.
    pub fn with_history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window;
        self
    }

    /// Stored personality, or the fallback if absent, empty, or unreadable
    pub async fn get_personality(&self) -> String {
        match self.store.get(PERSONALITY_KEY).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => self.fallback_personality.clone(),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored personality is not valid UTF-8, using fallback");
                    self.fallback_personality.clone()
                }
            },
            Ok(None) => self.fallback_personality.clone(),
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Failed to load personality, using fallback");
                self.fallback_personality.clone()
            }
        }
    }

    /// Replace the personality wholesale
    pub async fn set_personality(&self, text: &str) {
        if let Err(e) = self.store.put(PERSONALITY_KEY, text.as_bytes()).await {
            tracing::error!(error = %e, kind = ?e.kind(), "Failed to save personality");
            return;
        }
        tracing::info!(chars = text.chars().count(), "Personality updated");
    }

    /// Current transcript (empty if none stored or unreadable)
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.load_transcript().await
    }

    /// Prompt sent to the provider: system entry, history window, new user turn
    pub fn build_prompt(
        &self,
        personality: &str,
        transcript: &[ChatMessage],
        text: &str,
    ) -> Vec<ChatMessage> {
        let history = match self.history_window {
            Some(window) if transcript.len() > window => &transcript[transcript.len() - window..],
            _ => transcript,
        };

        let mut prompt = Vec::with_capacity(history.len() + 2);
        prompt.push(ChatMessage::system(personality));
        prompt.extend_from_slice(history);
        prompt.push(ChatMessage::user(text));
        prompt
    }

    /// Run one mention-triggered exchange.
    ///
    /// The provider call runs without any lock so a slow completion only
    /// delays its own mention. On success the `(user, assistant)` pair is
    /// appended to the stored transcript under `transcript_guard`. On
    /// failure nothing is written.
    pub async fn handle_mention(&self, text: &str) -> Result<String, CompletionError> {
        let transcript = self.load_transcript().await;
        let personality = self.get_personality().await;
        let prompt = self.build_prompt(&personality, &transcript, text);

        tracing::debug!(
            history = transcript.len(),
            prompt_messages = prompt.len(),
            "Requesting completion"
        );

        let reply = match self.provider.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Completion request failed");
                return Err(e);
            }
        };

        self.append_exchange(text, &reply).await;
        Ok(reply)
    }

    /// Append one exchange to whatever is stored now, so concurrent
    /// mentions never drop each other's entries
    async fn append_exchange(&self, text: &str, reply: &str) {
        let _guard = self.transcript_guard.lock().await;

        let mut updated = self.load_transcript().await;
        updated.push(ChatMessage::user(text));
        updated.push(ChatMessage::assistant(reply));
        self.save_transcript(&updated).await;
    }

    async fn load_transcript(&self) -> Vec<ChatMessage> {
        let bytes = match self.store.get(TRANSCRIPT_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Failed to load transcript (returning empty)");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(error = %e, "Stored transcript is malformed (returning empty)");
                Vec::new()
            }
        }
    }

    async fn save_transcript(&self, transcript: &[ChatMessage]) {
        let data = match serde_json::to_vec(transcript) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize transcript");
                return;
            }
        };

        if let Err(e) = self.store.put(TRANSCRIPT_KEY, &data).await {
            tracing::error!(error = %e, kind = ?e.kind(), "Failed to save transcript");
            return;
        }
        tracing::debug!(entries = transcript.len(), "Transcript saved");
    }
}
