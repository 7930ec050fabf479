// ABOUTME: Tests for the presence draft state machine
// ABOUTME: Verifies partial merges, concurrent edits, publish gating, retry and restart survival

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use vanir_core::presence::ActivityButton;
use vanir_core::store::{KeyValueStore, DRAFT_KEY};
use vanir_core::{
    ActivityKind, BotError, DraftManager, FieldGroup, MemoryStore, OnlineStatus, PresenceDraft,
    PresencePublisher, PublishOutcome, SqliteStore,
};

/// Gateway stand-in that records published drafts and can be told to fail
#[derive(Default)]
struct MockGateway {
    published: Mutex<Vec<PresenceDraft>>,
    fail: AtomicBool,
}

impl MockGateway {
    fn calls(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl PresencePublisher for MockGateway {
    async fn update_presence(&self, draft: &PresenceDraft) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("gateway connection reset");
        }
        self.published.lock().unwrap().push(draft.clone());
        Ok(())
    }
}

/// Store that yields between a read and the caller's next step, so
/// unguarded read-modify-write sequences would interleave
#[derive(Default)]
struct YieldingStore {
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for YieldingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BotError> {
        let value = self.inner.get(key).await;
        tokio::task::yield_now().await;
        value
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BotError> {
        tokio::task::yield_now().await;
        self.inner.put(key, value).await
    }
}

fn general(status: &str, kind: &str, name: &str) -> FieldGroup {
    FieldGroup::general(status, kind, name, "")
}

fn assets(large: &str, small: &str, url: &str) -> FieldGroup {
    FieldGroup::Assets {
        large_image: large.into(),
        large_text: "Large".into(),
        small_image: small.into(),
        small_text: "Small".into(),
        url: url.into(),
    }
}

fn button(label: &str, url: &str) -> FieldGroup {
    FieldGroup::Buttons {
        buttons: vec![ActivityButton {
            label: label.into(),
            url: url.into(),
        }],
    }
}

// =============================================================================
// SCENARIO: Field groups merge without clobbering each other
// =============================================================================

#[tokio::test]
async fn scenario_assets_edit_keeps_general_fields() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    drafts.apply_field_group(general("idle", "playing", "chess")).await;
    drafts.apply_field_group(assets("board", "", "")).await;

    let draft = drafts.load_draft().await;
    let primary = draft.primary_activity().unwrap();
    assert_eq!(draft.status, OnlineStatus::Idle);
    assert_eq!(primary.kind, ActivityKind::Playing);
    assert_eq!(primary.name, "chess");
    assert_eq!(primary.assets.as_ref().unwrap().large_image, "board");
}

#[tokio::test]
async fn scenario_disjoint_groups_commute() {
    let groups = [
        general("dnd", "listening", "lofi"),
        assets("cover", "badge", "https://example.com/stream"),
        button("Listen", "https://example.com"),
    ];

    let forward = DraftManager::new(Arc::new(MemoryStore::new()));
    for group in groups.iter().cloned() {
        forward.apply_field_group(group).await;
    }

    let reverse = DraftManager::new(Arc::new(MemoryStore::new()));
    for group in groups.iter().rev().cloned() {
        reverse.apply_field_group(group).await;
    }

    let mut expected = PresenceDraft::default();
    for group in groups.iter().cloned() {
        group.apply_to(&mut expected);
    }

    assert_eq!(forward.load_draft().await, expected);
    assert_eq!(reverse.load_draft().await, expected);
}

#[tokio::test]
async fn scenario_unknown_enum_inputs_fall_back() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    drafts.apply_field_group(general("loud", "dancing", "ballet")).await;

    let draft = drafts.load_draft().await;
    assert_eq!(draft.status, OnlineStatus::Online);
    assert_eq!(draft.primary_activity().unwrap().kind, ActivityKind::Playing);
}

#[tokio::test]
async fn scenario_custom_kind_is_not_selectable_from_general_form() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    drafts.apply_field_group(general("online", "custom", "nope")).await;
    assert_eq!(
        drafts.load_draft().await.primary_activity().unwrap().kind,
        ActivityKind::Playing
    );
}

#[tokio::test]
async fn scenario_apply_returns_confirmation_without_publishing() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    let message = drafts.apply_field_group(general("idle", "watching", "films")).await;
    assert!(message.contains("saved"));
    assert!(message.contains("Apply"));
}

// =============================================================================
// SCENARIO: Concurrent edits to different field groups
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scenario_interleaved_general_and_assets_edits_keep_both() {
    let drafts = Arc::new(DraftManager::new(Arc::new(YieldingStore::default())));

    let mut handles = Vec::new();
    for i in 0..20 {
        let drafts = drafts.clone();
        let group = if i % 2 == 0 {
            general("idle", "playing", "chess")
        } else {
            assets("board", "pawn", "")
        };
        handles.push(tokio::spawn(async move {
            drafts.apply_field_group(group).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().contains("saved"));
    }

    let draft = drafts.load_draft().await;
    assert_eq!(draft.status, OnlineStatus::Idle);
    assert_eq!(draft.activities.len(), 1);
    let primary = draft.primary_activity().unwrap();
    assert_eq!(primary.name, "chess");
    let art = primary.assets.as_ref().expect("assets lost to a concurrent edit");
    assert_eq!(art.large_image, "board");
    assert_eq!(art.small_image.as_deref(), Some("pawn"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scenario_custom_status_survives_concurrent_group_edits() {
    let drafts = Arc::new(DraftManager::new(Arc::new(YieldingStore::default())));

    let mut handles = Vec::new();
    for i in 0..21 {
        let drafts = drafts.clone();
        handles.push(tokio::spawn(async move {
            match i % 3 {
                0 => drafts.set_custom_status(Some("thinking".into())).await,
                1 => drafts.apply_field_group(general("dnd", "watching", "films")).await,
                _ => drafts.apply_field_group(button("Watch", "https://example.com")).await,
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let draft = drafts.load_draft().await;
    assert_eq!(draft.status, OnlineStatus::Dnd);
    assert_eq!(draft.activities.len(), 2);
    assert_eq!(
        draft.custom_status().and_then(|a| a.state.as_deref()),
        Some("thinking")
    );
    let primary = draft.primary_activity().unwrap();
    assert_eq!(primary.kind, ActivityKind::Watching);
    assert_eq!(primary.name, "films");
    assert_eq!(primary.buttons.len(), 1);
    assert_eq!(primary.buttons[0].label, "Watch");
}

// =============================================================================
// SCENARIO: Publish is gated on a stored draft and leaves it in place
// =============================================================================

#[tokio::test]
async fn scenario_publish_without_draft_makes_no_gateway_call() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    let gateway = MockGateway::default();

    assert_eq!(drafts.publish(&gateway).await, PublishOutcome::NoDraft);
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn scenario_corrupt_draft_counts_as_no_draft() {
    let store = Arc::new(MemoryStore::new());
    store.put(DRAFT_KEY, b"not json").await.unwrap();
    let drafts = DraftManager::new(store);
    let gateway = MockGateway::default();

    assert_eq!(drafts.publish(&gateway).await, PublishOutcome::NoDraft);
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn scenario_failed_publish_keeps_draft_for_retry() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    drafts.apply_field_group(general("dnd", "competing", "finals")).await;
    let before = drafts.load_draft().await;

    let gateway = MockGateway::default();
    gateway.fail.store(true, Ordering::SeqCst);
    let outcome = drafts.publish(&gateway).await;
    assert!(matches!(outcome, PublishOutcome::Failed(ref e) if e.contains("reset")));
    assert_eq!(drafts.load_draft().await, before);

    gateway.fail.store(false, Ordering::SeqCst);
    assert_eq!(drafts.publish(&gateway).await, PublishOutcome::Published);
    assert_eq!(gateway.calls(), 1);
    assert_eq!(drafts.load_draft().await, before);
}

#[tokio::test]
async fn scenario_custom_status_published_first() {
    let drafts = DraftManager::new(Arc::new(MemoryStore::new()));
    drafts.apply_field_group(general("online", "playing", "chess")).await;
    drafts.set_custom_status(Some("thinking".into())).await;

    let gateway = MockGateway::default();
    drafts.publish(&gateway).await;

    let published = gateway.published.lock().unwrap();
    let order = published[0].publish_order();
    assert_eq!(order[0].kind, ActivityKind::Custom);
    assert_eq!(order[1].name, "chess");
}

// =============================================================================
// SCENARIO: Draft survives a restart with the on-disk store
// =============================================================================

#[tokio::test]
async fn scenario_draft_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("bot_memory.db");

    {
        let drafts = DraftManager::new(Arc::new(SqliteStore::open(&db_path).unwrap()));
        drafts.apply_field_group(general("idle", "streaming", "speedrun")).await;
        drafts
            .apply_field_group(assets("", "", "https://twitch.tv/vanir"))
            .await;
    }

    let drafts = DraftManager::new(Arc::new(SqliteStore::open(&db_path).unwrap()));
    assert!(drafts.has_draft().await);
    let draft = drafts.load_draft().await;
    let primary = draft.primary_activity().unwrap();
    assert_eq!(primary.kind, ActivityKind::Streaming);
    assert_eq!(primary.url.as_deref(), Some("https://twitch.tv/vanir"));
    assert!(primary.assets.is_none());
}
