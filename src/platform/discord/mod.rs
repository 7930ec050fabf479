// ABOUTME: Discord platform implementation backed by serenity's gateway client
// ABOUTME: Turns mentions, slash commands, buttons, and modals into dispatcher events

pub mod components;
pub mod presence;

pub use presence::DiscordPresence;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::all::{
    Client, Command, Context, CreateCommand, EventHandler, GatewayIntents, Interaction, Message,
    Ready,
};
use std::sync::Arc;
use vanir_core::dispatch::{Dispatcher, InboundEvent, Response};
use vanir_core::traits::registered_commands;
use vanir_core::utils::{chunk_message, strip_mention, DISCORD_MAX_CHARS};

use components::{interaction_response, modal_submission, Origin};

// =============================================================================
// DiscordPlatform - owns the gateway connection
// =============================================================================

pub struct DiscordPlatform {
    token: String,
    dispatcher: Arc<Dispatcher>,
}

impl DiscordPlatform {
    pub fn new(token: impl Into<String>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            token: token.into(),
            dispatcher,
        }
    }

    /// Connect to the gateway and process events until the client stops
    pub async fn run(self) -> Result<()> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(&self.token, intents)
            .event_handler(Handler {
                dispatcher: self.dispatcher,
            })
            .await
            .context("Failed to create Discord client")?;

        tracing::info!(platform = "discord", "Starting gateway connection");
        client.start().await.context("Discord client error")?;
        Ok(())
    }
}

// =============================================================================
// Handler - serenity event callbacks
// =============================================================================

struct Handler {
    dispatcher: Arc<Dispatcher>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord"
        );

        let commands: Vec<CreateCommand> = registered_commands()
            .into_iter()
            .map(|def| CreateCommand::new(def.name).description(def.description))
            .collect();
        match Command::set_global_commands(&ctx.http, commands).await {
            Ok(registered) => {
                tracing::info!(count = registered.len(), "Slash commands registered")
            }
            Err(e) => tracing::error!(error = %e, "Failed to register slash commands"),
        }

        let publisher = DiscordPresence::new(ctx.clone());
        self.dispatcher.restore_presence(&publisher).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore bots, including ourselves
        if msg.author.bot {
            return;
        }

        let bot_id = ctx.cache.current_user().id;
        if !msg.mentions_user_id(bot_id) {
            return;
        }

        let text = strip_mention(&msg.content, &bot_id.to_string());
        tracing::info!(
            channel = %msg.channel_id,
            author = %msg.author.name,
            chars = text.chars().count(),
            "Mention received"
        );

        let typing = msg.channel_id.start_typing(&ctx.http);
        let publisher = DiscordPresence::new(ctx.clone());
        let response = self
            .dispatcher
            .handle(InboundEvent::Mention { text }, &publisher)
            .await;
        typing.stop();

        if let Response::Reply(reply) = response {
            send_reply(&ctx, &msg, &reply).await;
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let publisher = DiscordPresence::new(ctx.clone());

        match interaction {
            Interaction::Command(command) => {
                tracing::debug!(command = %command.data.name, user = %command.user.name, "Slash command");
                let event = InboundEvent::Command {
                    name: command.data.name.clone(),
                };
                let response = self.dispatcher.handle(event, &publisher).await;
                if let Err(e) = command
                    .create_response(&ctx.http, interaction_response(response, Origin::SlashCommand))
                    .await
                {
                    tracing::error!(error = %e, command = %command.data.name, "Failed to respond to command");
                }
            }
            Interaction::Component(component) => {
                let custom_id = component.data.custom_id.clone();
                tracing::debug!(custom_id = %custom_id, user = %component.user.name, "Component pressed");
                let event = InboundEvent::Component {
                    custom_id: custom_id.clone(),
                };
                let response = self.dispatcher.handle(event, &publisher).await;
                if let Err(e) = component
                    .create_response(&ctx.http, interaction_response(response, Origin::MenuMessage))
                    .await
                {
                    tracing::error!(error = %e, custom_id = %custom_id, "Failed to respond to component");
                }
            }
            Interaction::Modal(modal) => {
                let submission = modal_submission(&modal);
                tracing::debug!(form = %submission.form_id, fields = submission.values.len(), "Form submitted");
                let origin = if modal.message.is_some() {
                    Origin::MenuMessage
                } else {
                    Origin::SlashCommand
                };
                let response = self
                    .dispatcher
                    .handle(InboundEvent::FormSubmit(submission), &publisher)
                    .await;
                if let Err(e) = modal
                    .create_response(&ctx.http, interaction_response(response, origin))
                    .await
                {
                    tracing::error!(error = %e, form = %modal.data.custom_id, "Failed to respond to form");
                }
            }
            _ => {}
        }
    }
}

/// Reply to the mention, splitting long text across several messages
async fn send_reply(ctx: &Context, msg: &Message, reply: &str) {
    let chunks = chunk_message(reply, DISCORD_MAX_CHARS)
        .into_iter()
        .filter(|c| !c.trim().is_empty());
    for (i, chunk) in chunks.enumerate() {
        let result = if i == 0 {
            msg.reply(ctx, chunk).await.map(|_| ())
        } else {
            msg.channel_id.say(&ctx.http, chunk).await.map(|_| ())
        };
        if let Err(e) = result {
            tracing::error!(error = %e, channel = %msg.channel_id, "Failed to send reply");
            return;
        }
    }
}
