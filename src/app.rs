//! Event routing: decides which flow handles an incoming message or button
//! press and turns flow errors into a user-facing retry message.

use std::sync::Arc;

use tracing::{debug, error};

use crate::backend::Backend;
use crate::config::BotConfig;
use crate::errors::FlowError;
use crate::inbound::{Inbound, UserProfile};
use crate::keyboards::CallbackData;
use crate::localization::LocalizationManager;
use crate::menu::{self, MenuCommand};
use crate::registration::RegistrationFlow;
use crate::reply::{CallbackOutcome, Reply};
use crate::subscription::MembershipChecker;
use crate::ticketing;

/// Shared collaborators of every flow
#[derive(Clone)]
pub struct BotContext {
    pub config: Arc<BotConfig>,
    pub backend: Arc<dyn Backend>,
    pub membership: Arc<dyn MembershipChecker>,
    pub texts: Arc<LocalizationManager>,
}

pub struct App {
    ctx: BotContext,
    registration: RegistrationFlow,
}

impl App {
    pub fn new(ctx: BotContext) -> Self {
        Self {
            registration: RegistrationFlow::new(ctx.clone()),
            ctx,
        }
    }

    pub fn registration(&self) -> &RegistrationFlow {
        &self.registration
    }

    /// Handle a message; never fails, errors become a "try again" reply
    pub async fn on_message(&self, inbound: &Inbound) -> Vec<Reply> {
        match self.route_message(inbound).await {
            Ok(replies) => replies,
            Err(e) => {
                error!(user_id = %inbound.user.id, error = %e, "Failed to handle message");
                vec![menu::try_again(&self.ctx, inbound.user.language())]
            }
        }
    }

    async fn route_message(&self, inbound: &Inbound) -> Result<Vec<Reply>, FlowError> {
        let lang = inbound.user.language();

        if inbound.is_start_command() {
            return self.registration.start(&inbound.user).await;
        }

        if let Some(replies) = self.registration.handle_message(inbound).await? {
            return Ok(replies);
        }

        let command = inbound
            .text
            .as_deref()
            .and_then(|text| MenuCommand::parse(text, &self.ctx.texts));
        match command {
            Some(command) => menu::dispatch(&self.ctx, command, lang).await,
            None => Ok(menu::hint(&self.ctx, lang)),
        }
    }

    /// Handle an inline button press
    pub async fn on_callback(&self, user: &UserProfile, data: &str) -> CallbackOutcome {
        let Some(data) = CallbackData::parse(data) else {
            debug!(user_id = %user.id, data = %data, "Ignoring unknown callback data");
            return CallbackOutcome::default();
        };

        let result: Result<CallbackOutcome, FlowError> = match data {
            CallbackData::Joined => self
                .registration
                .confirm_joined(user)
                .await
                .map(CallbackOutcome::from),
            CallbackData::Region { .. } | CallbackData::District { .. }
                if !self.ctx.config.ticketing_enabled =>
            {
                Ok(ticketing::unavailable(&self.ctx, user))
            }
            CallbackData::Region { id, purpose } => {
                ticketing::select_region(&self.ctx, user, id, purpose).await
            }
            CallbackData::District { id, purpose } => {
                ticketing::select_district(&self.ctx, user, id, purpose).await
            }
        };

        result.unwrap_or_else(|e| {
            error!(user_id = %user.id, error = %e, "Failed to handle callback");
            CallbackOutcome {
                replies: Vec::new(),
                notice: Some(self.ctx.texts.text("error-try-again", user.language())),
            }
        })
    }
}
