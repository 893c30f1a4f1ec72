//! Keyboard layouts as plain data.
//!
//! Every builder here is a pure function of its inputs; turning a layout into
//! Telegram markup happens in `bot::ui_builder`.

use reqwest::Url;

use crate::backend::{District, Region};
use crate::config::{Channel, SocialLink};
use crate::localization::LocalizationManager;

/// Buttons per row for region and district pickers
pub const PICKER_ROW_WIDTH: usize = 3;
/// Buttons per row for the age picker
pub const AGE_ROW_WIDTH: usize = 2;

/// Callback data of the "I've joined" button
pub const JOINED_CALLBACK: &str = "joined";

/// A button of a reply (bottom) keyboard
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyButton {
    pub text: String,
    pub request_contact: bool,
}

impl ReplyButton {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: false,
        }
    }

    pub fn contact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: true,
        }
    }
}

/// What pressing an inline button does
#[derive(Debug, Clone, PartialEq)]
pub enum InlineAction {
    Url(Url),
    Callback(String),
}

/// A button attached to a message
#[derive(Debug, Clone, PartialEq)]
pub struct InlineButton {
    pub text: String,
    pub action: InlineAction,
}

impl InlineButton {
    pub fn url(text: impl Into<String>, url: Url) -> Self {
        Self {
            text: text.into(),
            action: InlineAction::Url(url),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: InlineAction::Callback(data.into()),
        }
    }
}

pub type InlineLayout = Vec<Vec<InlineButton>>;

/// Keyboard attached to an outgoing message
#[derive(Debug, Clone, PartialEq)]
pub enum Keyboard {
    /// Leave whatever keyboard the user currently has
    Keep,
    /// Remove the reply keyboard
    Remove,
    Reply {
        rows: Vec<Vec<ReplyButton>>,
        resize: bool,
    },
    Inline(InlineLayout),
}

impl Keyboard {
    /// Inline rows if this is an inline keyboard
    pub fn inline_rows(&self) -> Option<&InlineLayout> {
        match self {
            Keyboard::Inline(rows) => Some(rows),
            _ => None,
        }
    }
}

/// What a region or district pick is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
    /// Completing the user's own profile
    Registration,
    /// Choosing a debate to get a ticket for
    Ticket,
}

impl PickPurpose {
    pub fn key(self) -> &'static str {
        match self {
            PickPurpose::Registration => "reg",
            PickPurpose::Ticket => "get_ticket",
        }
    }

    /// Unknown keys are read as [`PickPurpose::Registration`]
    pub fn from_key(key: &str) -> Self {
        if key == PickPurpose::Ticket.key() {
            PickPurpose::Ticket
        } else {
            PickPurpose::Registration
        }
    }
}

/// Parsed inline button callback data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Joined,
    Region { id: i64, purpose: PickPurpose },
    District { id: i64, purpose: PickPurpose },
}

impl CallbackData {
    pub fn parse(data: &str) -> Option<Self> {
        if data == JOINED_CALLBACK {
            return Some(CallbackData::Joined);
        }

        let mut parts = data.splitn(3, ':');
        let kind = parts.next()?;
        let id: i64 = parts.next()?.parse().ok()?;
        let purpose = PickPurpose::from_key(parts.next().unwrap_or_default());

        match kind {
            "region" => Some(CallbackData::Region { id, purpose }),
            "district" => Some(CallbackData::District { id, purpose }),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackData::Joined => JOINED_CALLBACK.to_string(),
            CallbackData::Region { id, purpose } => format!("region:{id}:{}", purpose.key()),
            CallbackData::District { id, purpose } => format!("district:{id}:{}", purpose.key()),
        }
    }
}

/// Split items into rows of at most `width`
pub fn chunk_rows<T: Clone>(items: &[T], width: usize) -> Vec<Vec<T>> {
    items.chunks(width.max(1)).map(|row| row.to_vec()).collect()
}

/// Main menu reply keyboard
pub fn main_menu(texts: &LocalizationManager, language_code: Option<&str>) -> Keyboard {
    Keyboard::Reply {
        rows: vec![
            vec![ReplyButton::text(texts.text("menu-upcoming-debates", language_code))],
            vec![ReplyButton::text(texts.text("menu-register-debate", language_code))],
        ],
        resize: true,
    }
}

/// Single contact-sharing button
pub fn phone_request(
    texts: &LocalizationManager,
    language_code: Option<&str>,
    resize: bool,
) -> Keyboard {
    Keyboard::Reply {
        rows: vec![vec![ReplyButton::contact(texts.text("phone-button", language_code))]],
        resize,
    }
}

/// All English levels on one row
pub fn english_levels(levels: &[String], resize: bool) -> Keyboard {
    Keyboard::Reply {
        rows: vec![levels.iter().map(ReplyButton::text).collect()],
        resize,
    }
}

/// Age brackets in rows of [`AGE_ROW_WIDTH`]
pub fn age_brackets(brackets: &[String], resize: bool) -> Keyboard {
    let buttons: Vec<ReplyButton> = brackets.iter().map(ReplyButton::text).collect();
    Keyboard::Reply {
        rows: chunk_rows(&buttons, AGE_ROW_WIDTH),
        resize,
    }
}

/// One URL button per unjoined channel, then the social link and the
/// "I've joined" acknowledgment
pub fn join_channels(
    unjoined: &[Channel],
    social: &SocialLink,
    texts: &LocalizationManager,
    language_code: Option<&str>,
) -> Keyboard {
    let mut rows: InlineLayout = unjoined
        .iter()
        .map(|channel| vec![InlineButton::url(&channel.name, channel.link.clone())])
        .collect();

    rows.push(vec![InlineButton::url(&social.label, social.link.clone())]);
    rows.push(vec![InlineButton::callback(
        texts.text("joined-button", language_code),
        JOINED_CALLBACK,
    )]);

    Keyboard::Inline(rows)
}

/// Region picker; consecutive duplicates (one per debate) collapse to one button
pub fn regions(regions: &[Region], purpose: PickPurpose) -> Keyboard {
    let mut unique = regions.to_vec();
    unique.dedup_by_key(|region| region.id);

    let buttons: Vec<InlineButton> = unique
        .iter()
        .map(|region| {
            let data = CallbackData::Region {
                id: region.id,
                purpose,
            };
            InlineButton::callback(&region.name, data.encode())
        })
        .collect();

    Keyboard::Inline(chunk_rows(&buttons, PICKER_ROW_WIDTH))
}

/// District picker, always attached to an edited picker message
pub fn districts(districts: &[District], purpose: PickPurpose) -> InlineLayout {
    let buttons: Vec<InlineButton> = districts
        .iter()
        .map(|district| {
            let data = CallbackData::District {
                id: district.id,
                purpose,
            };
            InlineButton::callback(&district.name, data.encode())
        })
        .collect();

    chunk_rows(&buttons, PICKER_ROW_WIDTH)
}
