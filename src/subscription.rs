//! Subscription gate: a user may only register once they are a member of every
//! configured channel.

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};
use tracing::{debug, warn};

use crate::config::Channel;
use crate::errors::MembershipError;

/// Membership of one user in one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Member,
    NotMember,
}

/// Looks up channel membership on the chat platform
#[async_trait]
pub trait MembershipChecker: Send + Sync {
    async fn membership(
        &self,
        channel: ChatId,
        user: UserId,
    ) -> Result<MembershipStatus, MembershipError>;
}

/// Configured channels split by the user's membership, in configuration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionStatus {
    pub joined: Vec<Channel>,
    pub unjoined: Vec<Channel>,
}

impl SubscriptionStatus {
    pub fn is_fully_subscribed(&self) -> bool {
        self.unjoined.is_empty()
    }
}

/// Check every configured channel for `user`.
///
/// Lookup failures count as "not joined" and are only logged.
pub async fn check_subscriptions(
    checker: &dyn MembershipChecker,
    channels: &[Channel],
    user: UserId,
) -> SubscriptionStatus {
    let mut status = SubscriptionStatus::default();

    for channel in channels {
        let joined = match checker.membership(channel.id, user).await {
            Ok(MembershipStatus::Member) => true,
            Ok(MembershipStatus::NotMember) => false,
            Err(e) => {
                warn!(
                    user_id = %user,
                    channel_id = %channel.id,
                    error = %e,
                    "Membership lookup failed, treating channel as not joined"
                );
                false
            }
        };

        if joined {
            status.joined.push(channel.clone());
        } else {
            status.unjoined.push(channel.clone());
        }
    }

    debug!(
        user_id = %user,
        joined = status.joined.len(),
        unjoined = status.unjoined.len(),
        "Subscription check finished"
    );
    status
}
