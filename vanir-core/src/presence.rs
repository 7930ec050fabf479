// ABOUTME: Presence configuration model: online status, activities, assets, and buttons
// ABOUTME: Closed enums with total string tables so form input round-trips predictably

use serde::{Deserialize, Serialize};

/// Overall online status of the bot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    #[default]
    Online,
    Idle,
    Dnd,
    Invisible,
}

const STATUS_NAMES: [(OnlineStatus, &str); 4] = [
    (OnlineStatus::Online, "online"),
    (OnlineStatus::Idle, "idle"),
    (OnlineStatus::Dnd, "dnd"),
    (OnlineStatus::Invisible, "invisible"),
];

impl OnlineStatus {
    pub fn as_str(&self) -> &'static str {
        STATUS_NAMES
            .iter()
            .find(|(status, _)| status == self)
            .map(|(_, name)| *name)
            .unwrap_or("online")
    }

    /// Parse user input, falling back to `Online` for anything unrecognized
    pub fn from_input(input: &str) -> Self {
        let needle = input.trim().to_lowercase();
        match STATUS_NAMES.iter().find(|(_, name)| *name == needle) {
            Some((status, _)) => *status,
            None => {
                tracing::debug!(input = %input, "Unrecognized status, using online");
                OnlineStatus::Online
            }
        }
    }
}

impl std::fmt::Display for OnlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an activity. `Custom` is the free-text custom status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    Playing,
    Streaming,
    Listening,
    Watching,
    Competing,
    Custom,
}

const KIND_NAMES: [(ActivityKind, &str); 6] = [
    (ActivityKind::Playing, "playing"),
    (ActivityKind::Streaming, "streaming"),
    (ActivityKind::Listening, "listening"),
    (ActivityKind::Watching, "watching"),
    (ActivityKind::Competing, "competing"),
    (ActivityKind::Custom, "custom"),
];

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        KIND_NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("playing")
    }

    /// Parse user input for the primary activity.
    ///
    /// Unknown input falls back to `Playing`. `custom` is not selectable
    /// here: the primary activity is by definition non-custom.
    pub fn from_input(input: &str) -> Self {
        let needle = input.trim().to_lowercase();
        match KIND_NAMES.iter().find(|(_, name)| *name == needle) {
            Some((ActivityKind::Custom, _)) | None => {
                tracing::debug!(input = %input, "Unrecognized activity type, using playing");
                ActivityKind::Playing
            }
            Some((kind, _)) => *kind,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ActivityKind::Custom)
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rich-presence images attached to an activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityAssets {
    pub large_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

/// Labeled hyperlink shown under an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityButton {
    pub label: String,
    pub url: String,
}

/// Maximum number of buttons tracked on the primary activity
pub const MAX_BUTTONS: usize = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    /// Free text of a custom status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<ActivityAssets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ActivityButton>,
}

impl Activity {
    pub fn custom_status(text: impl Into<String>) -> Self {
        Self {
            kind: ActivityKind::Custom,
            name: "Custom Status".to_string(),
            state: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Desired presence, built up field group by field group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceDraft {
    #[serde(default)]
    pub status: OnlineStatus,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Default for PresenceDraft {
    /// Skeleton used before anything is stored: online with one empty activity
    fn default() -> Self {
        Self {
            status: OnlineStatus::Online,
            activities: vec![Activity::default()],
        }
    }
}

impl PresenceDraft {
    /// First non-custom activity
    pub fn primary_activity(&self) -> Option<&Activity> {
        self.activities.iter().find(|a| !a.kind.is_custom())
    }

    /// First non-custom activity, appending an empty one if none exists
    pub fn primary_activity_mut(&mut self) -> &mut Activity {
        let index = match self.activities.iter().position(|a| !a.kind.is_custom()) {
            Some(index) => index,
            None => {
                self.activities.push(Activity::default());
                self.activities.len() - 1
            }
        };
        &mut self.activities[index]
    }

    pub fn custom_status(&self) -> Option<&Activity> {
        self.activities.iter().find(|a| a.kind.is_custom())
    }

    /// Activities in publication order: custom status first, the rest in stored order
    pub fn publish_order(&self) -> Vec<&Activity> {
        let (custom, rest): (Vec<&Activity>, Vec<&Activity>) =
            self.activities.iter().partition(|a| a.kind.is_custom());
        custom.into_iter().chain(rest).collect()
    }

    /// One-line human summary for confirmations and logs
    pub fn summary(&self) -> String {
        match self.primary_activity() {
            Some(activity) if !activity.name.is_empty() => {
                format!("{} · {} {}", self.status, activity.kind, activity.name)
            }
            _ => format!("{} · no activity", self.status),
        }
    }
}
