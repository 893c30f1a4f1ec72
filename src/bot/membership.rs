//! Channel membership lookups through the Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, ChatMemberStatus};
use teloxide::{ApiError, RequestError};

use crate::errors::MembershipError;
use crate::subscription::{MembershipChecker, MembershipStatus};

pub struct TelegramMembership {
    bot: Bot,
}

impl TelegramMembership {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MembershipChecker for TelegramMembership {
    async fn membership(
        &self,
        channel: ChatId,
        user: UserId,
    ) -> Result<MembershipStatus, MembershipError> {
        let member = self
            .bot
            .get_chat_member(channel, user)
            .await
            .map_err(classify)?;
        Ok(status_of(&member.kind))
    }
}

/// Left and banned users are not members; every other status is
pub fn status_of(kind: &ChatMemberKind) -> MembershipStatus {
    match kind.status() {
        ChatMemberStatus::Left | ChatMemberStatus::Banned => MembershipStatus::NotMember,
        _ => MembershipStatus::Member,
    }
}

pub fn classify(error: RequestError) -> MembershipError {
    match error {
        RequestError::Api(ApiError::UserNotFound) => {
            MembershipError::UnknownUser(error.to_string())
        }
        RequestError::Api(ApiError::ChatNotFound | ApiError::BotKicked) => {
            MembershipError::Permission(error.to_string())
        }
        RequestError::Api(ref api) => {
            let text = api.to_string().to_lowercase();
            let denied = ["inaccessible", "not enough rights", "admin"];
            if denied.iter().any(|needle| text.contains(needle)) {
                MembershipError::Permission(text)
            } else {
                MembershipError::Other(text)
            }
        }
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_) => {
            MembershipError::Network(error.to_string())
        }
        other => MembershipError::Other(other.to_string()),
    }
}
