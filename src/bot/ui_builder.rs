//! Converts keyboard layouts into Telegram markup

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    ReplyMarkup,
};

use crate::keyboards::{InlineAction, InlineButton, InlineLayout, Keyboard, ReplyButton};

/// Markup for an outgoing message; `None` leaves the current keyboard alone
pub fn to_reply_markup(keyboard: &Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Keep => None,
        Keyboard::Remove => Some(ReplyMarkup::kb_remove()),
        Keyboard::Reply { rows, resize } => {
            let buttons = rows
                .iter()
                .map(|row| row.iter().map(reply_button).collect::<Vec<_>>());
            let mut markup = KeyboardMarkup::new(buttons);
            if *resize {
                markup = markup.resize_keyboard();
            }
            Some(ReplyMarkup::Keyboard(markup))
        }
        Keyboard::Inline(rows) => Some(ReplyMarkup::InlineKeyboard(to_inline_markup(rows))),
    }
}

pub fn to_inline_markup(rows: &InlineLayout) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(inline_button).collect::<Vec<_>>()),
    )
}

fn reply_button(button: &ReplyButton) -> KeyboardButton {
    let markup = KeyboardButton::new(button.text.clone());
    if button.request_contact {
        markup.request(ButtonRequest::Contact)
    } else {
        markup
    }
}

fn inline_button(button: &InlineButton) -> InlineKeyboardButton {
    match &button.action {
        InlineAction::Url(url) => InlineKeyboardButton::url(button.text.clone(), url.clone()),
        InlineAction::Callback(data) => {
            InlineKeyboardButton::callback(button.text.clone(), data.clone())
        }
    }
}
