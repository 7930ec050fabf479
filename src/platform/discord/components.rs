// ABOUTME: Renders dispatcher responses as Discord interaction payloads
// ABOUTME: Builds menu buttons and modals, and reads modal submissions back into forms

use serenity::all::{
    ActionRowComponent, ButtonStyle as GatewayButtonStyle, CreateActionRow, CreateButton,
    CreateInputText, CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal,
    InputTextStyle, ModalInteraction,
};
use vanir_core::dispatch::{ButtonStyle, MenuAction, MenuView, Response};
use vanir_core::forms::{FieldStyle, FormSubmission, FormView};
use vanir_core::utils::{chunk_message, DISCORD_MAX_CHARS};

/// Where the interaction came from, which decides how menu updates render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    SlashCommand,
    MenuMessage,
}

pub fn interaction_response(response: Response, origin: Origin) -> CreateInteractionResponse {
    match response {
        Response::Reply(text) => {
            let first = chunk_message(&text, DISCORD_MAX_CHARS)
                .into_iter()
                .next()
                .unwrap_or_default();
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(first))
        }
        Response::Notice(text) => notice(text),
        Response::Menu(view) => CreateInteractionResponse::Message(menu_message(&view)),
        Response::Form(view) => CreateInteractionResponse::Modal(form_modal(&view)),
        Response::MenuUpdate(text) => match origin {
            // Content-only update keeps the menu buttons in place
            Origin::MenuMessage => CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new().content(text),
            ),
            Origin::SlashCommand => notice(text),
        },
    }
}

fn notice(text: String) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(text)
            .ephemeral(true),
    )
}

fn menu_message(view: &MenuView) -> CreateInteractionResponseMessage {
    let buttons = view.actions.iter().map(menu_button).collect();
    CreateInteractionResponseMessage::new()
        .content(view.content.clone())
        .components(vec![CreateActionRow::Buttons(buttons)])
        .ephemeral(true)
}

fn menu_button(action: &MenuAction) -> CreateButton {
    let style = match action.style() {
        ButtonStyle::Primary => GatewayButtonStyle::Primary,
        ButtonStyle::Secondary => GatewayButtonStyle::Secondary,
        ButtonStyle::Success => GatewayButtonStyle::Success,
    };
    CreateButton::new(action.custom_id())
        .label(action.label())
        .style(style)
}

pub fn form_modal(view: &FormView) -> CreateModal {
    let rows = view
        .fields
        .iter()
        .map(|(spec, value)| {
            let style = match spec.style {
                FieldStyle::Short => InputTextStyle::Short,
                FieldStyle::Paragraph => InputTextStyle::Paragraph,
            };
            let mut input = CreateInputText::new(style, spec.label, spec.id)
                .placeholder(spec.placeholder)
                .required(spec.required)
                .max_length(spec.max_length);
            if !value.is_empty() {
                input = input.value(value.clone());
            }
            CreateActionRow::InputText(input)
        })
        .collect();

    CreateModal::new(view.kind.id(), view.kind.title()).components(rows)
}

/// Collect every text input of a submitted modal, keyed by its custom id
pub fn modal_submission(modal: &ModalInteraction) -> FormSubmission {
    let mut submission = FormSubmission::new(modal.data.custom_id.clone());
    for row in &modal.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                submission
                    .values
                    .insert(input.custom_id.clone(), input.value.clone().unwrap_or_default());
            }
        }
    }
    submission
}
