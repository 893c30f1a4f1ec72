//! Performs a batch of replies against the Bot API, in order

use anyhow::Result;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use tracing::{debug, warn};

use crate::reply::Reply;

use super::ui_builder::{to_inline_markup, to_reply_markup};

/// Send `replies` to `chat_id`.
///
/// `origin` is the message an inline button was pressed on, if any. Deleting a
/// message is best effort; a failed delete is logged and the batch goes on.
pub async fn perform(
    bot: &Bot,
    chat_id: ChatId,
    origin: Option<MessageId>,
    replies: Vec<Reply>,
) -> Result<()> {
    let mut sent: Vec<Option<MessageId>> = Vec::with_capacity(replies.len());

    for reply in replies {
        let message_id = match reply {
            Reply::Text { text, keyboard } => {
                let request = bot.send_message(chat_id, text);
                let message = match to_reply_markup(&keyboard) {
                    Some(markup) => request.reply_markup(markup).await?,
                    None => request.await?,
                };
                Some(message.id)
            }
            Reply::Photo {
                url,
                caption,
                fallback,
            } => Some(send_photo(bot, chat_id, &url, caption, fallback).await?),
            Reply::Pause(delay) => {
                tokio::time::sleep(delay).await;
                None
            }
            Reply::DeleteSent(index) => {
                match sent.get(index).copied().flatten() {
                    Some(message_id) => delete(bot, chat_id, message_id).await,
                    None => debug!(index, "Nothing to delete at batch index"),
                }
                None
            }
            Reply::DeleteOrigin => {
                if let Some(message_id) = origin {
                    delete(bot, chat_id, message_id).await;
                }
                None
            }
            Reply::EditOrigin { text, keyboard } => {
                match origin {
                    Some(message_id) => {
                        bot.edit_message_text(chat_id, message_id, text)
                            .reply_markup(to_inline_markup(&keyboard))
                            .await?;
                    }
                    None => warn!(chat_id = %chat_id, "Edit requested without an origin message"),
                }
                None
            }
        };
        sent.push(message_id);
    }

    Ok(())
}

/// Photo by URL; plain text with `fallback` if Telegram rejects the photo
async fn send_photo(
    bot: &Bot,
    chat_id: ChatId,
    url: &str,
    caption: String,
    fallback: String,
) -> Result<MessageId> {
    let photo = match Url::parse(url) {
        Ok(url) => bot.send_photo(chat_id, InputFile::url(url)).caption(caption).await,
        Err(e) => {
            warn!(url = %url, error = %e, "Invalid photo URL, sending text instead");
            return Ok(bot.send_message(chat_id, fallback).await?.id);
        }
    };

    match photo {
        Ok(message) => Ok(message.id),
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to send photo, sending text instead");
            Ok(bot.send_message(chat_id, fallback).await?.id)
        }
    }
}

async fn delete(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    if let Err(e) = bot.delete_message(chat_id, message_id).await {
        warn!(
            chat_id = %chat_id,
            message_id = message_id.0,
            error = %e,
            "Failed to delete message"
        );
    }
}
