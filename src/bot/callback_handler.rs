//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::app::App;
use crate::inbound::UserProfile;

use super::render::perform;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, app: Arc<App>) -> Result<()> {
    let data = q.data.as_deref().unwrap_or("");
    debug!(user_id = %q.from.id, data = %data, "Received callback query");

    let user = UserProfile::from(&q.from);
    let outcome = app.on_callback(&user, data).await;

    let answer = bot.answer_callback_query(q.id.clone());
    match outcome.notice {
        Some(notice) => answer.text(notice).await?,
        None => answer.await?,
    };

    if outcome.replies.is_empty() {
        return Ok(());
    }

    match &q.message {
        Some(msg) => perform(&bot, msg.chat().id, Some(msg.id()), outcome.replies).await,
        None => perform(&bot, ChatId::from(q.from.id), None, outcome.replies).await,
    }
}
