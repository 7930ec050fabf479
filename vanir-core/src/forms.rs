// ABOUTME: Typed form schemas for presence and personality editing
// ABOUTME: Pre-fills forms from stored state and decodes submissions by field id

use std::collections::HashMap;
use thiserror::Error;

use crate::draft::FieldGroup;
use crate::presence::{ActivityButton, PresenceDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    Short,
    Paragraph,
}

/// One named input of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub style: FieldStyle,
    pub required: bool,
    pub max_length: u16,
    pub placeholder: &'static str,
}

const fn short(
    id: &'static str,
    label: &'static str,
    required: bool,
    max_length: u16,
    placeholder: &'static str,
) -> FieldSpec {
    FieldSpec {
        id,
        label,
        style: FieldStyle::Short,
        required,
        max_length,
        placeholder,
    }
}

pub const STATUS_FIELD: &str = "status_input";
pub const TYPE_FIELD: &str = "type_input";
pub const NAME_FIELD: &str = "activity_input";
pub const DETAILS_FIELD: &str = "details_input";
pub const LARGE_KEY_FIELD: &str = "large_key_input";
pub const LARGE_TEXT_FIELD: &str = "large_text_input";
pub const SMALL_KEY_FIELD: &str = "small_key_input";
pub const SMALL_TEXT_FIELD: &str = "small_text_input";
pub const URL_FIELD: &str = "url_input";
pub const BUTTON_LABEL_FIELD: &str = "button_label_input";
pub const BUTTON_URL_FIELD: &str = "button_url_input";
pub const CUSTOM_STATUS_FIELD: &str = "custom_status_input";
pub const PERSONALITY_FIELD: &str = "persona_input";

const GENERAL_FIELDS: [FieldSpec; 4] = [
    short(STATUS_FIELD, "Status (online, idle, dnd, invisible)", true, 10, "online"),
    short(TYPE_FIELD, "Activity Type (playing, watching...)", true, 10, "playing"),
    short(NAME_FIELD, "Activity Name", true, 100, "Visual Studio Code"),
    short(DETAILS_FIELD, "Details", false, 100, "Optional"),
];

const ASSET_FIELDS: [FieldSpec; 5] = [
    short(LARGE_KEY_FIELD, "Large Image Asset Key", false, 50, "Leave empty for no images"),
    short(LARGE_TEXT_FIELD, "Large Image Tooltip", false, 100, "Shown on hover"),
    short(SMALL_KEY_FIELD, "Small Image Asset Key", false, 50, "Optional"),
    short(SMALL_TEXT_FIELD, "Small Image Tooltip", false, 100, "Optional"),
    short(URL_FIELD, "Streaming URL", false, 256, "Only used when the type is streaming"),
];

const BUTTON_FIELDS: [FieldSpec; 2] = [
    short(BUTTON_LABEL_FIELD, "Button Label", false, 32, "Leave empty for no button"),
    short(BUTTON_URL_FIELD, "Button URL", false, 256, "https://"),
];

const CUSTOM_STATUS_FIELDS: [FieldSpec; 1] = [short(
    CUSTOM_STATUS_FIELD,
    "Custom Status",
    false,
    128,
    "Leave empty to remove",
)];

const PERSONALITY_FIELDS: [FieldSpec; 1] = [FieldSpec {
    id: PERSONALITY_FIELD,
    label: "System Prompt",
    style: FieldStyle::Paragraph,
    required: true,
    max_length: 2000,
    placeholder: "You are a helpful assistant...",
}];

/// Every form the bot can open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    General,
    Assets,
    Buttons,
    CustomStatus,
    Personality,
}

impl FormKind {
    pub const ALL: [FormKind; 5] = [
        FormKind::General,
        FormKind::Assets,
        FormKind::Buttons,
        FormKind::CustomStatus,
        FormKind::Personality,
    ];

    /// Stable identifier carried through the platform round trip
    pub fn id(&self) -> &'static str {
        match self {
            FormKind::General => "modal_general_config",
            FormKind::Assets => "modal_assets_config",
            FormKind::Buttons => "modal_buttons_config",
            FormKind::CustomStatus => "modal_custom_status",
            FormKind::Personality => "personality_modal",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormKind::General => "General Status & Activity",
            FormKind::Assets => "Images & Streaming Link",
            FormKind::Buttons => "Activity Button",
            FormKind::CustomStatus => "Custom Status",
            FormKind::Personality => "Edit AI Personality",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            FormKind::General => &GENERAL_FIELDS,
            FormKind::Assets => &ASSET_FIELDS,
            FormKind::Buttons => &BUTTON_FIELDS,
            FormKind::CustomStatus => &CUSTOM_STATUS_FIELDS,
            FormKind::Personality => &PERSONALITY_FIELDS,
        }
    }

    /// Validate and decode a submission for this form
    pub fn decode(&self, submission: &FormSubmission) -> Result<FormInput, FormError> {
        let values = validate(self.fields(), submission)?;
        let get = |id: &str| values.get(id).cloned().unwrap_or_default();

        let input = match self {
            FormKind::General => FormInput::FieldGroup(FieldGroup::general(
                &get(STATUS_FIELD),
                &get(TYPE_FIELD),
                get(NAME_FIELD),
                get(DETAILS_FIELD),
            )),
            FormKind::Assets => FormInput::FieldGroup(FieldGroup::Assets {
                large_image: get(LARGE_KEY_FIELD),
                large_text: get(LARGE_TEXT_FIELD),
                small_image: get(SMALL_KEY_FIELD),
                small_text: get(SMALL_TEXT_FIELD),
                url: get(URL_FIELD),
            }),
            FormKind::Buttons => {
                let label = get(BUTTON_LABEL_FIELD);
                let url = get(BUTTON_URL_FIELD);
                let buttons = if label.is_empty() || url.is_empty() {
                    Vec::new()
                } else {
                    vec![ActivityButton { label, url }]
                };
                FormInput::FieldGroup(FieldGroup::Buttons { buttons })
            }
            FormKind::CustomStatus => {
                let text = get(CUSTOM_STATUS_FIELD);
                FormInput::CustomStatus((!text.is_empty()).then_some(text))
            }
            FormKind::Personality => FormInput::Personality(get(PERSONALITY_FIELD)),
        };
        Ok(input)
    }
}

/// Decoded content of a valid submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInput {
    FieldGroup(FieldGroup),
    CustomStatus(Option<String>),
    Personality(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Unknown form: {0}")]
    UnknownForm(String),
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: u16 },
}

/// Raw user-entered values keyed by field id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    pub form_id: String,
    pub values: HashMap<String, String>,
}

impl FormSubmission {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, field_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field_id.into(), value.into());
        self
    }

    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.values.get(field_id).map(|v| v.as_str())
    }

    pub fn kind(&self) -> Result<FormKind, FormError> {
        FormKind::from_id(&self.form_id).ok_or_else(|| FormError::UnknownForm(self.form_id.clone()))
    }
}

fn validate(
    fields: &[FieldSpec],
    submission: &FormSubmission,
) -> Result<HashMap<&'static str, String>, FormError> {
    let mut values = HashMap::with_capacity(fields.len());
    for field in fields {
        let value = submission.value(field.id).unwrap_or_default().trim().to_string();
        if field.required && value.is_empty() {
            return Err(FormError::MissingField(field.label));
        }
        if value.chars().count() > field.max_length as usize {
            return Err(FormError::TooLong {
                field: field.label,
                max: field.max_length,
            });
        }
        values.insert(field.id, value);
    }
    Ok(values)
}

/// A form ready to show, with each field's pre-filled value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub kind: FormKind,
    pub fields: Vec<(FieldSpec, String)>,
}

impl FormView {
    /// Pre-fill a presence form from the stored draft
    pub fn from_draft(kind: FormKind, draft: &PresenceDraft) -> Self {
        let primary = draft.primary_activity();
        let assets = primary.and_then(|a| a.assets.as_ref());
        let button = primary.and_then(|a| a.buttons.first());

        let fields = kind
            .fields()
            .iter()
            .map(|field| {
                let value = match field.id {
                    STATUS_FIELD => draft.status.as_str().to_string(),
                    TYPE_FIELD => primary.map(|a| a.kind).unwrap_or_default().as_str().to_string(),
                    NAME_FIELD => primary.map(|a| a.name.clone()).unwrap_or_default(),
                    DETAILS_FIELD => primary.map(|a| a.details.clone()).unwrap_or_default(),
                    LARGE_KEY_FIELD => assets.map(|a| a.large_image.clone()).unwrap_or_default(),
                    LARGE_TEXT_FIELD => assets.and_then(|a| a.large_text.clone()).unwrap_or_default(),
                    SMALL_KEY_FIELD => assets.and_then(|a| a.small_image.clone()).unwrap_or_default(),
                    SMALL_TEXT_FIELD => assets.and_then(|a| a.small_text.clone()).unwrap_or_default(),
                    URL_FIELD => primary.and_then(|a| a.url.clone()).unwrap_or_default(),
                    BUTTON_LABEL_FIELD => button.map(|b| b.label.clone()).unwrap_or_default(),
                    BUTTON_URL_FIELD => button.map(|b| b.url.clone()).unwrap_or_default(),
                    CUSTOM_STATUS_FIELD => draft
                        .custom_status()
                        .and_then(|a| a.state.clone())
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                (*field, value)
            })
            .collect();

        Self { kind, fields }
    }

    /// Personality form pre-filled with the current system prompt
    pub fn personality(current: &str) -> Self {
        let fields = PERSONALITY_FIELDS
            .iter()
            .map(|field| {
                let value: String = current.chars().take(field.max_length as usize).collect();
                (*field, value)
            })
            .collect();
        Self {
            kind: FormKind::Personality,
            fields,
        }
    }

    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(spec, _)| spec.id == field_id)
            .map(|(_, value)| value.as_str())
    }
}
