// ABOUTME: Error taxonomy shared by the conversation and presence subsystems
// ABOUTME: Configuration, transport, and persistence failures plus completion-call errors

use thiserror::Error;

/// Top-level failure categories.
///
/// Configuration errors are fatal at startup and recoverable per call,
/// transport errors are reported once to the user, and persistence errors
/// degrade to in-memory defaults.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Coarse classification used for logging and user-facing notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Persistence,
}

impl BotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Failure of a single completion-provider call
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("completion API key is not set")]
    MissingCredential,
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    MalformedPayload(String),
}

impl CompletionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential | Self::MalformedPayload(_) => ErrorKind::Configuration,
            Self::Transport(_) | Self::Status { .. } => ErrorKind::Transport,
        }
    }
}
