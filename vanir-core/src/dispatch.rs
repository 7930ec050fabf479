// ABOUTME: Platform-agnostic event dispatch for mentions, commands, menu buttons, and forms
// ABOUTME: Routes each inbound event to the session and describes the response to render

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::Config;
use crate::draft::PublishOutcome;
use crate::forms::{FormInput, FormKind, FormSubmission, FormView};
use crate::session::Session;
use crate::traits::{PresencePublisher, CONFIG_COMMAND, PERSONALITY_COMMAND};

/// Reply to a mention that carries no text besides the mention itself
pub const GREETING: &str = "Hello! Ping me with a question and I'll remember the context.";

/// Reply when the completion round trip fails for any reason
pub const FAILURE_NOTICE: &str = "Sorry, I ran into an issue connecting to the AI. Check the logs.";

pub const PERSONALITY_UPDATED: &str = "Personality Updated!";

/// Something the platform delivered that the bot may act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A message addressed to the bot, mention already stripped
    Mention { text: String },
    /// A slash command by name
    Command { name: String },
    /// A button press on a menu message
    Component { custom_id: String },
    /// A submitted form
    FormSubmit(FormSubmission),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
}

/// Buttons on the configuration menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Edit(FormKind),
    Apply,
}

impl MenuAction {
    pub const ALL: [MenuAction; 5] = [
        MenuAction::Edit(FormKind::General),
        MenuAction::Edit(FormKind::Assets),
        MenuAction::Edit(FormKind::Buttons),
        MenuAction::Edit(FormKind::CustomStatus),
        MenuAction::Apply,
    ];

    pub fn custom_id(&self) -> &'static str {
        match self {
            MenuAction::Edit(FormKind::General) => "button_general_config",
            MenuAction::Edit(FormKind::Assets) => "button_assets_config",
            MenuAction::Edit(FormKind::Buttons) => "button_buttons_config",
            MenuAction::Edit(FormKind::CustomStatus) => "button_custom_status",
            MenuAction::Edit(FormKind::Personality) => "button_personality",
            MenuAction::Apply => "button_apply_config",
        }
    }

    pub fn from_custom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.custom_id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Edit(FormKind::General) => "Edit General Status",
            MenuAction::Edit(FormKind::Assets) => "Edit Images/URL",
            MenuAction::Edit(FormKind::Buttons) => "Edit Button",
            MenuAction::Edit(FormKind::CustomStatus) => "Edit Custom Status",
            MenuAction::Edit(FormKind::Personality) => "Edit Personality",
            MenuAction::Apply => "Apply",
        }
    }

    pub fn style(&self) -> ButtonStyle {
        match self {
            MenuAction::Edit(FormKind::General) => ButtonStyle::Primary,
            MenuAction::Edit(_) => ButtonStyle::Secondary,
            MenuAction::Apply => ButtonStyle::Success,
        }
    }
}

/// The configuration menu: a message with one button per action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub content: String,
    pub actions: Vec<MenuAction>,
}

impl MenuView {
    fn new(summary: &str) -> Self {
        Self {
            content: format!(
                "**Presence Configuration Menu**\n\nEdit a section, then press **Apply** to publish.\nCurrent draft: {}",
                summary
            ),
            actions: MenuAction::ALL.to_vec(),
        }
    }
}

/// What the platform adapter should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Public reply in the channel the mention came from
    Reply(String),
    /// Short private note to the invoking user
    Notice(String),
    /// Open the configuration menu
    Menu(MenuView),
    /// Open a form
    Form(FormView),
    /// Replace the text of the menu message the interaction came from
    MenuUpdate(String),
}

pub struct Dispatcher {
    session: Arc<Session>,
    reply_floor: Duration,
    restore_on_start: bool,
}

impl Dispatcher {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            reply_floor: Duration::from_secs(1),
            restore_on_start: true,
        }
    }

    pub fn from_config(session: Arc<Session>, config: &Config) -> Self {
        Self::new(session)
            .with_reply_floor(config.conversation.reply_floor())
            .with_restore_on_start(config.presence.restore_on_start)
    }

    pub fn with_reply_floor(mut self, floor: Duration) -> Self {
        self.reply_floor = floor;
        self
    }

    pub fn with_restore_on_start(mut self, restore: bool) -> Self {
        self.restore_on_start = restore;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn handle(&self, event: InboundEvent, publisher: &dyn PresencePublisher) -> Response {
        match event {
            InboundEvent::Mention { text } => self.handle_mention(&text).await,
            InboundEvent::Command { name } => self.handle_command(&name).await,
            InboundEvent::Component { custom_id } => {
                self.handle_component(&custom_id, publisher).await
            }
            InboundEvent::FormSubmit(submission) => self.handle_submission(&submission).await,
        }
    }

    /// Publish the stored draft once after the gateway connects
    pub async fn restore_presence(
        &self,
        publisher: &dyn PresencePublisher,
    ) -> Option<PublishOutcome> {
        if !self.restore_on_start {
            return None;
        }
        if !self.session.drafts().has_draft().await {
            tracing::debug!("No stored presence draft to restore");
            return None;
        }

        let outcome = self.session.drafts().publish(publisher).await;
        tracing::info!(?outcome, "Presence restore attempted");
        Some(outcome)
    }

    async fn handle_mention(&self, text: &str) -> Response {
        let deadline = Instant::now() + self.reply_floor;

        let reply = if text.trim().is_empty() {
            GREETING.to_string()
        } else {
            match self.session.conversation().handle_mention(text).await {
                Ok(reply) => reply,
                // Already logged with its kind by the conversation manager
                Err(_) => FAILURE_NOTICE.to_string(),
            }
        };

        tokio::time::sleep_until(deadline).await;
        Response::Reply(reply)
    }

    async fn handle_command(&self, name: &str) -> Response {
        match name {
            CONFIG_COMMAND => {
                let draft = self.session.drafts().load_draft().await;
                Response::Menu(MenuView::new(&draft.summary()))
            }
            PERSONALITY_COMMAND => {
                let current = self.session.conversation().get_personality().await;
                Response::Form(FormView::personality(&current))
            }
            other => {
                tracing::warn!(command = %other, "Unknown command");
                Response::Notice("Unknown command".to_string())
            }
        }
    }

    async fn handle_component(&self, custom_id: &str, publisher: &dyn PresencePublisher) -> Response {
        match MenuAction::from_custom_id(custom_id) {
            Some(MenuAction::Edit(kind)) => {
                let draft = self.session.drafts().load_draft().await;
                Response::Form(FormView::from_draft(kind, &draft))
            }
            Some(MenuAction::Apply) => {
                let outcome = self.session.drafts().publish(publisher).await;
                Response::MenuUpdate(outcome.message())
            }
            None => {
                tracing::warn!(custom_id = %custom_id, "Unknown component");
                Response::Notice("Unknown action.".to_string())
            }
        }
    }

    async fn handle_submission(&self, submission: &FormSubmission) -> Response {
        let input = match submission.kind().and_then(|kind| kind.decode(submission)) {
            Ok(input) => input,
            Err(e) => {
                tracing::info!(form = %submission.form_id, error = %e, "Rejected form submission");
                return Response::Notice(e.to_string());
            }
        };

        match input {
            FormInput::FieldGroup(group) => {
                Response::MenuUpdate(self.session.drafts().apply_field_group(group).await)
            }
            FormInput::CustomStatus(text) => {
                Response::MenuUpdate(self.session.drafts().set_custom_status(text).await)
            }
            FormInput::Personality(text) => {
                self.session.conversation().set_personality(&text).await;
                Response::Notice(PERSONALITY_UPDATED.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversationConfig;
    use crate::conversation::ChatMessage;
    use crate::error::CompletionError;
    use crate::forms::{NAME_FIELD, PERSONALITY_FIELD, STATUS_FIELD, TYPE_FIELD};
    use crate::presence::{OnlineStatus, PresenceDraft};
    use crate::provider::CompletionProvider;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedProvider(Result<String, CompletionError>);

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, CompletionError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        calls: Mutex<Vec<PresenceDraft>>,
    }

    #[async_trait]
    impl PresencePublisher for RecordingPublisher {
        async fn update_presence(&self, draft: &PresenceDraft) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(draft.clone());
            Ok(())
        }
    }

    fn dispatcher(reply: Result<String, CompletionError>) -> Dispatcher {
        let session = Session::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedProvider(reply)),
            &ConversationConfig::default(),
        );
        Dispatcher::new(Arc::new(session)).with_reply_floor(Duration::ZERO)
    }

    fn mention(text: &str) -> InboundEvent {
        InboundEvent::Mention { text: text.into() }
    }

    #[tokio::test]
    async fn test_empty_mention_greets_without_completion() {
        let d = dispatcher(Err(CompletionError::MissingCredential));
        let publisher = RecordingPublisher::default();
        assert_eq!(
            d.handle(mention("  "), &publisher).await,
            Response::Reply(GREETING.into())
        );
        assert!(d.session().conversation().transcript().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_completion_replies_with_notice() {
        let d = dispatcher(Err(CompletionError::Transport("refused".into())));
        let publisher = RecordingPublisher::default();
        assert_eq!(
            d.handle(mention("hi"), &publisher).await,
            Response::Reply(FAILURE_NOTICE.into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_floor() {
        let d = dispatcher(Ok("hey".into())).with_reply_floor(Duration::from_millis(1000));
        let publisher = RecordingPublisher::default();

        let started = Instant::now();
        let response = d.handle(mention("hi"), &publisher).await;

        assert_eq!(response, Response::Reply("hey".into()));
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_config_command_opens_menu() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();
        let Response::Menu(menu) = d
            .handle(InboundEvent::Command { name: "config".into() }, &publisher)
            .await
        else {
            panic!("expected menu");
        };
        assert_eq!(menu.actions.len(), 5);
        assert!(menu.content.contains("online · no activity"));
    }

    #[tokio::test]
    async fn test_unknown_command_and_component() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();
        assert_eq!(
            d.handle(InboundEvent::Command { name: "dance".into() }, &publisher)
                .await,
            Response::Notice("Unknown command".into())
        );
        assert!(matches!(
            d.handle(
                InboundEvent::Component {
                    custom_id: "button_mystery".into()
                },
                &publisher
            )
            .await,
            Response::Notice(_)
        ));
    }

    #[tokio::test]
    async fn test_menu_flow_submits_then_applies() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();

        let submission = FormSubmission::new(FormKind::General.id())
            .with(STATUS_FIELD, "dnd")
            .with(TYPE_FIELD, "competing")
            .with(NAME_FIELD, "chess");
        let response = d.handle(InboundEvent::FormSubmit(submission), &publisher).await;
        assert!(matches!(response, Response::MenuUpdate(ref msg) if msg.contains("saved")));
        assert!(publisher.calls.lock().unwrap().is_empty());

        let response = d
            .handle(
                InboundEvent::Component {
                    custom_id: MenuAction::Apply.custom_id().into(),
                },
                &publisher,
            )
            .await;
        assert_eq!(
            response,
            Response::MenuUpdate(PublishOutcome::Published.message())
        );

        let calls = publisher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].status, OnlineStatus::Dnd);
    }

    #[tokio::test]
    async fn test_edit_button_prefills_form() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();
        d.session().drafts().set_custom_status(Some("brb".into())).await;

        let Response::Form(view) = d
            .handle(
                InboundEvent::Component {
                    custom_id: "button_custom_status".into(),
                },
                &publisher,
            )
            .await
        else {
            panic!("expected form");
        };
        assert_eq!(view.kind, FormKind::CustomStatus);
        assert_eq!(view.fields[0].1, "brb");
    }

    #[tokio::test]
    async fn test_invalid_submission_is_a_notice() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();
        let submission = FormSubmission::new(FormKind::General.id()).with(STATUS_FIELD, "idle");
        let response = d.handle(InboundEvent::FormSubmit(submission), &publisher).await;
        assert!(matches!(response, Response::Notice(ref msg) if msg.contains("required")));
        assert!(!d.session().drafts().has_draft().await);
    }

    #[tokio::test]
    async fn test_personality_submission() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();
        let submission =
            FormSubmission::new(FormKind::Personality.id()).with(PERSONALITY_FIELD, "Be brief.");
        assert_eq!(
            d.handle(InboundEvent::FormSubmit(submission), &publisher)
                .await,
            Response::Notice(PERSONALITY_UPDATED.into())
        );

        let Response::Form(view) = d
            .handle(
                InboundEvent::Command {
                    name: "personality".into(),
                },
                &publisher,
            )
            .await
        else {
            panic!("expected form");
        };
        assert_eq!(view.value(PERSONALITY_FIELD), Some("Be brief."));
    }

    #[tokio::test]
    async fn test_restore_presence_only_with_stored_draft() {
        let d = dispatcher(Ok("unused".into()));
        let publisher = RecordingPublisher::default();
        assert_eq!(d.restore_presence(&publisher).await, None);

        d.session().drafts().set_custom_status(Some("back soon".into())).await;
        assert_eq!(
            d.restore_presence(&publisher).await,
            Some(PublishOutcome::Published)
        );
        assert_eq!(publisher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_presence_disabled() {
        let d = dispatcher(Ok("unused".into())).with_restore_on_start(false);
        let publisher = RecordingPublisher::default();
        d.session().drafts().set_custom_status(Some("back soon".into())).await;
        assert_eq!(d.restore_presence(&publisher).await, None);
        assert!(publisher.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_menu_action_ids_roundtrip() {
        for action in MenuAction::ALL {
            assert_eq!(MenuAction::from_custom_id(action.custom_id()), Some(action));
        }
    }
}
