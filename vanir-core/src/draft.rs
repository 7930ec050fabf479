// ABOUTME: Presence draft state machine persisted across independent UI interactions.
// ABOUTME: Partial-merge field-group edits, custom status edits, and publication to the gateway.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::presence::{
    Activity, ActivityAssets, ActivityButton, ActivityKind, OnlineStatus, PresenceDraft,
    MAX_BUTTONS,
};
use crate::store::{KeyValueStore, DRAFT_KEY};
use crate::traits::PresencePublisher;

/// A named subset of draft fields edited together by one form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldGroup {
    /// Status plus the primary activity's type, name, and details
    General {
        status: OnlineStatus,
        kind: ActivityKind,
        name: String,
        details: String,
    },
    /// Primary activity images and external URL
    Assets {
        large_image: String,
        large_text: String,
        small_image: String,
        small_text: String,
        url: String,
    },
    /// Primary activity hyperlink buttons
    Buttons { buttons: Vec<ActivityButton> },
}

impl FieldGroup {
    /// General group from raw user input; unknown enum values fall back to defaults
    pub fn general(
        status: &str,
        kind: &str,
        name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        FieldGroup::General {
            status: OnlineStatus::from_input(status),
            kind: ActivityKind::from_input(kind),
            name: name.into(),
            details: details.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldGroup::General { .. } => "General settings",
            FieldGroup::Assets { .. } => "Images/URL",
            FieldGroup::Buttons { .. } => "Button",
        }
    }

    /// Overwrite exactly this group's fields; everything else stays as loaded
    pub fn apply_to(self, draft: &mut PresenceDraft) {
        match self {
            FieldGroup::General {
                status,
                kind,
                name,
                details,
            } => {
                draft.status = status;
                let activity = draft.primary_activity_mut();
                activity.kind = kind;
                activity.name = name;
                activity.details = details;
            }
            FieldGroup::Assets {
                large_image,
                large_text,
                small_image,
                small_text,
                url,
            } => {
                let activity = draft.primary_activity_mut();
                // No large image means no asset block at all, small image included
                activity.assets = non_empty(large_image).map(|large_image| ActivityAssets {
                    large_image,
                    large_text: non_empty(large_text),
                    small_image: non_empty(small_image),
                    small_text: non_empty(small_text),
                });
                activity.url = non_empty(url);
            }
            FieldGroup::Buttons { buttons } => {
                let activity = draft.primary_activity_mut();
                activity.buttons = buttons
                    .into_iter()
                    .filter(|b| !b.label.trim().is_empty() && !b.url.trim().is_empty())
                    .take(MAX_BUTTONS)
                    .collect();
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    NoDraft,
    Failed(String),
}

impl PublishOutcome {
    pub fn message(&self) -> String {
        match self {
            PublishOutcome::Published => "**Status Updated Successfully!**".to_string(),
            PublishOutcome::NoDraft => {
                "Nothing to apply yet. Edit a section of the configuration first.".to_string()
            }
            PublishOutcome::Failed(_) => {
                "**Status Update FAILED!** Check bot logs for details. Your edits are kept, press Apply to retry."
                    .to_string()
            }
        }
    }
}

/// Owns the single presence draft slot.
///
/// All read-modify-write sequences run under `draft_guard`.
pub struct DraftManager {
    store: Arc<dyn KeyValueStore>,
    draft_guard: Mutex<()>,
}

impl DraftManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            draft_guard: Mutex::new(()),
        }
    }

    /// Stored draft, or the default skeleton. Never fails outward.
    pub async fn load_draft(&self) -> PresenceDraft {
        self.stored_draft().await.unwrap_or_default()
    }

    /// Merge one field group over the stored draft and persist it
    pub async fn apply_field_group(&self, group: FieldGroup) -> String {
        let _guard = self.draft_guard.lock().await;

        let mut draft = self.load_draft().await;
        let label = group.label();
        group.apply_to(&mut draft);
        let saved = self.save_draft(&draft).await;

        tracing::info!(group = %label, summary = %draft.summary(), saved, "Draft field group applied");

        if saved {
            format!("{} saved. Press **Apply** to publish.", label)
        } else {
            format!(
                "{} updated, but it could not be stored and may be lost on restart.",
                label
            )
        }
    }

    /// Set, replace, or remove (`None`) the custom status entry
    pub async fn set_custom_status(&self, text: Option<String>) -> String {
        let _guard = self.draft_guard.lock().await;

        let mut draft = self.load_draft().await;
        let text = text.and_then(non_empty);
        let existing = draft.activities.iter().position(|a| a.kind.is_custom());

        match (existing, text) {
            (Some(index), Some(text)) => draft.activities[index].state = Some(text),
            (None, Some(text)) => draft.activities.insert(0, Activity::custom_status(text)),
            (Some(_), None) => draft.activities.retain(|a| !a.kind.is_custom()),
            (None, None) => {}
        }

        let saved = self.save_draft(&draft).await;
        tracing::info!(
            custom_status = draft.custom_status().is_some(),
            saved,
            "Custom status updated"
        );

        if saved {
            "Custom status saved. Press **Apply** to publish.".to_string()
        } else {
            "Custom status updated, but it could not be stored and may be lost on restart."
                .to_string()
        }
    }

    /// Submit the stored draft to the gateway without clearing it
    pub async fn publish(&self, publisher: &dyn PresencePublisher) -> PublishOutcome {
        let draft = {
            let _guard = self.draft_guard.lock().await;
            self.stored_draft().await
        };

        let Some(draft) = draft else {
            tracing::info!("Publish requested with no stored draft");
            return PublishOutcome::NoDraft;
        };

        match publisher.update_presence(&draft).await {
            Ok(()) => {
                tracing::info!(summary = %draft.summary(), "Presence published");
                PublishOutcome::Published
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to publish presence");
                PublishOutcome::Failed(e.to_string())
            }
        }
    }

    /// Whether a draft has ever been stored
    pub async fn has_draft(&self) -> bool {
        self.stored_draft().await.is_some()
    }

    async fn stored_draft(&self) -> Option<PresenceDraft> {
        let bytes = match self.store.get(DRAFT_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Failed to load presence draft");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!(error = %e, "Stored presence draft is malformed");
                None
            }
        }
    }

    async fn save_draft(&self, draft: &PresenceDraft) -> bool {
        let data = match serde_json::to_vec(draft) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize presence draft");
                return false;
            }
        };

        match self.store.put(DRAFT_KEY, &data).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Failed to save presence draft");
                false
            }
        }
    }
}
