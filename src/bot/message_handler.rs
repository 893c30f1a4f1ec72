//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::app::App;
use crate::inbound::{Inbound, UserProfile};

use super::render::perform;

/// Turn a message into an [`Inbound`]; `None` for messages without a sender
pub fn to_inbound(msg: &Message) -> Option<Inbound> {
    let user = msg.from.as_ref()?;
    Some(Inbound {
        user: UserProfile::from(user),
        text: msg.text().map(str::to_string),
        contact_phone: msg.contact().map(|contact| contact.phone_number.clone()),
    })
}

pub async fn message_handler(bot: Bot, msg: Message, app: Arc<App>) -> Result<()> {
    if !msg.chat.is_private() {
        debug!(chat_id = %msg.chat.id, "Ignoring message outside a private chat");
        return Ok(());
    }

    let Some(inbound) = to_inbound(&msg) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };

    debug!(
        user_id = %inbound.user.id,
        has_text = inbound.text.is_some(),
        has_contact = inbound.contact_phone.is_some(),
        "Received message"
    );

    let replies = app.on_message(&inbound).await;
    perform(&bot, msg.chat.id, None, replies).await
}
