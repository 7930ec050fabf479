// ABOUTME: Publishes presence drafts to the Discord gateway
// ABOUTME: Maps draft statuses and activities onto serenity's presence types

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::all::{ActivityData, Context, OnlineStatus as GatewayStatus};
use vanir_core::presence::{Activity, ActivityKind, OnlineStatus, PresenceDraft};
use vanir_core::traits::PresencePublisher;

/// Presence publisher bound to one gateway shard context
pub struct DiscordPresence {
    ctx: Context,
}

impl DiscordPresence {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl PresencePublisher for DiscordPresence {
    async fn update_presence(&self, draft: &PresenceDraft) -> Result<()> {
        let (activity, skipped) = gateway_activity(draft)?;
        if skipped > 0 {
            // Bot accounts carry a single activity
            tracing::debug!(skipped, "Activities beyond the first were not sent");
        }

        self.ctx.set_presence(activity, gateway_status(draft.status));
        tracing::info!(summary = %draft.summary(), "Discord presence updated");
        Ok(())
    }
}

pub fn gateway_status(status: OnlineStatus) -> GatewayStatus {
    match status {
        OnlineStatus::Online => GatewayStatus::Online,
        OnlineStatus::Idle => GatewayStatus::Idle,
        OnlineStatus::Dnd => GatewayStatus::DoNotDisturb,
        OnlineStatus::Invisible => GatewayStatus::Invisible,
    }
}

/// First publishable activity in publish order, plus how many others were left out
pub fn gateway_activity(draft: &PresenceDraft) -> Result<(Option<ActivityData>, usize)> {
    let publishable: Vec<&Activity> = draft
        .publish_order()
        .into_iter()
        .filter(|a| a.kind.is_custom() || !a.name.trim().is_empty())
        .collect();

    match publishable.first() {
        Some(first) => Ok((Some(activity_data(first)?), publishable.len() - 1)),
        None => Ok((None, 0)),
    }
}

/// Convert one stored activity into the gateway representation.
///
/// Details travel in the `state` line. Assets and buttons are kept in the
/// draft but bot presences cannot display them.
pub fn activity_data(activity: &Activity) -> Result<ActivityData> {
    let name = activity.name.as_str();
    let mut data = match activity.kind {
        ActivityKind::Playing => ActivityData::playing(name),
        ActivityKind::Listening => ActivityData::listening(name),
        ActivityKind::Watching => ActivityData::watching(name),
        ActivityKind::Competing => ActivityData::competing(name),
        ActivityKind::Streaming => match activity.url.as_deref() {
            Some(url) => ActivityData::streaming(name, url)
                .with_context(|| format!("Invalid streaming URL: {}", url))?,
            None => {
                tracing::warn!(name = %name, "Streaming activity has no URL, publishing as playing");
                ActivityData::playing(name)
            }
        },
        ActivityKind::Custom => {
            return Ok(ActivityData::custom(
                activity.state.clone().unwrap_or_default(),
            ))
        }
    };

    if !activity.details.trim().is_empty() {
        data.state = Some(activity.details.clone());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::ActivityType;

    fn activity(kind: ActivityKind, name: &str) -> Activity {
        Activity {
            kind,
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(gateway_status(OnlineStatus::Dnd), GatewayStatus::DoNotDisturb);
        assert_eq!(gateway_status(OnlineStatus::Invisible), GatewayStatus::Invisible);
    }

    #[test]
    fn test_details_travel_in_state() {
        let mut listening = activity(ActivityKind::Listening, "lofi");
        listening.details = "side B".into();

        let data = activity_data(&listening).unwrap();
        assert_eq!(data.kind, ActivityType::Listening);
        assert_eq!(data.name, "lofi");
        assert_eq!(data.state.as_deref(), Some("side B"));
    }

    #[test]
    fn test_streaming_requires_valid_url() {
        let mut streaming = activity(ActivityKind::Streaming, "speedrun");
        streaming.url = Some("not a url".into());
        assert!(activity_data(&streaming).is_err());

        streaming.url = Some("https://twitch.tv/vanir".into());
        let data = activity_data(&streaming).unwrap();
        assert_eq!(data.kind, ActivityType::Streaming);
        assert!(data.url.is_some());
    }

    #[test]
    fn test_custom_status_goes_first() {
        let draft = PresenceDraft {
            status: OnlineStatus::Idle,
            activities: vec![
                activity(ActivityKind::Playing, "chess"),
                Activity::custom_status("afk"),
            ],
        };
        let (data, skipped) = gateway_activity(&draft).unwrap();
        let data = data.unwrap();
        assert_eq!(data.kind, ActivityType::Custom);
        assert_eq!(data.state.as_deref(), Some("afk"));
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_skeleton_draft_clears_activity() {
        let (data, skipped) = gateway_activity(&PresenceDraft::default()).unwrap();
        assert!(data.is_none());
        assert_eq!(skipped, 0);
    }
}
