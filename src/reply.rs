//! Outgoing message descriptors.
//!
//! Handlers return an ordered list of [`Reply`] values; the Telegram layer
//! performs them in order for the chat the event came from.

use std::time::Duration;

use crate::keyboards::{InlineLayout, Keyboard};

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Send a new text message
    Text { text: String, keyboard: Keyboard },
    /// Send a photo by URL; `fallback` is sent as text if the photo fails
    Photo {
        url: String,
        caption: String,
        fallback: String,
    },
    /// Wait before performing the next reply
    Pause(Duration),
    /// Delete the message produced by the reply at this index of the same batch
    DeleteSent(usize),
    /// Delete the message the triggering button belongs to
    DeleteOrigin,
    /// Replace the text and buttons of the message the triggering button belongs to
    EditOrigin { text: String, keyboard: InlineLayout },
}

impl Reply {
    pub fn text(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard,
        }
    }

    /// Text body if this reply sends or edits text
    pub fn body(&self) -> Option<&str> {
        match self {
            Reply::Text { text, .. } | Reply::EditOrigin { text, .. } => Some(text),
            Reply::Photo { caption, .. } => Some(caption),
            _ => None,
        }
    }
}

/// Result of handling a button press
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackOutcome {
    pub replies: Vec<Reply>,
    /// Short popup shown by answering the callback query
    pub notice: Option<String>,
}

impl From<Vec<Reply>> for CallbackOutcome {
    fn from(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            notice: None,
        }
    }
}
