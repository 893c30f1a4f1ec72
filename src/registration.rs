//! Registration state machine.
//!
//! `/start` upserts the user and runs the subscription gate. After that every
//! message from a user with a session is an answer to the current step: a valid
//! answer is written to the backend and advances the session, an invalid one
//! re-sends the prompt and leaves the session untouched.

use teloxide::types::UserId;
use tracing::{debug, info, warn};

use crate::app::BotContext;
use crate::backend::UserField;
use crate::dialogue::{
    validate_choice, validate_name, InputError, RegistrationSession, RegistrationStep,
    SessionStore,
};
use crate::errors::FlowError;
use crate::inbound::{Inbound, UserProfile};
use crate::keyboards::{self, Keyboard, PickPurpose};
use crate::reply::Reply;
use crate::subscription::check_subscriptions;

pub struct RegistrationFlow {
    ctx: BotContext,
    sessions: SessionStore,
}

impl RegistrationFlow {
    pub fn new(ctx: BotContext) -> Self {
        Self {
            ctx,
            sessions: SessionStore::new(),
        }
    }

    pub async fn session(&self, user: UserId) -> Result<Option<RegistrationSession>, FlowError> {
        Ok(self.sessions.get(user).await?)
    }

    /// Handle `/start`: record the user, then gate or ask for the name
    pub async fn start(&self, user: &UserProfile) -> Result<Vec<Reply>, FlowError> {
        self.ctx.backend.upsert_user(&user.to_new_user()).await?;
        info!(user_id = %user.id, "User record upserted, starting registration");

        self.enter(user, false).await
    }

    /// Handle the "I've joined" button.
    ///
    /// Only a gated session re-runs the gate, any number of times. A press from
    /// a user past the gate or without a session just removes the stale prompt.
    pub async fn confirm_joined(&self, user: &UserProfile) -> Result<Vec<Reply>, FlowError> {
        match self.sessions.get(user.id).await? {
            Some(session) if session.step == RegistrationStep::AwaitingSubscription => {
                self.enter(user, true).await
            }
            Some(session) => {
                debug!(user_id = %user.id, step = ?session.step, "Ignoring stale joined button");
                Ok(vec![Reply::DeleteOrigin])
            }
            None => {
                debug!(user_id = %user.id, "Ignoring joined button without a session");
                Ok(vec![Reply::DeleteOrigin])
            }
        }
    }

    /// Handle a message from a user with an open session.
    ///
    /// Returns `Ok(None)` when the user has no session.
    pub async fn handle_message(
        &self,
        inbound: &Inbound,
    ) -> Result<Option<Vec<Reply>>, FlowError> {
        let user = &inbound.user;
        let Some(session) = self.sessions.get(user.id).await? else {
            return Ok(None);
        };

        let replies = match session.step {
            RegistrationStep::AwaitingSubscription => self.enter(user, false).await?,
            RegistrationStep::AwaitingName => self.on_name(inbound, session).await?,
            RegistrationStep::AwaitingPhone => self.on_phone(inbound, session).await?,
            RegistrationStep::AwaitingEnglishLevel => {
                self.on_english_level(inbound, session).await?
            }
            RegistrationStep::AwaitingAge => self.on_age(inbound).await?,
        };

        Ok(Some(replies))
    }

    /// Run the gate; `from_button` means the join prompt being pressed is the origin
    async fn enter(&self, user: &UserProfile, from_button: bool) -> Result<Vec<Reply>, FlowError> {
        let texts = &self.ctx.texts;
        let lang = user.language();

        let status = check_subscriptions(
            self.ctx.membership.as_ref(),
            &self.ctx.config.channels,
            user.id,
        )
        .await;

        if !status.is_fully_subscribed() {
            info!(
                user_id = %user.id,
                unjoined = status.unjoined.len(),
                "User blocked by subscription gate"
            );
            self.sessions.update(user.id, RegistrationSession::gated()).await?;

            let prompt = Reply::text(
                texts.text("join-channels-prompt", lang),
                keyboards::join_channels(&status.unjoined, &self.ctx.config.social, texts, lang),
            );
            return Ok(if from_button {
                vec![
                    Reply::DeleteOrigin,
                    Reply::Pause(self.ctx.config.step_delay),
                    prompt,
                ]
            } else {
                vec![prompt]
            });
        }

        self.sessions.update(user.id, RegistrationSession::subscribed()).await?;

        let prompt = Reply::text(texts.text("name-prompt", lang), Keyboard::Remove);
        Ok(if from_button {
            vec![Reply::DeleteOrigin, prompt]
        } else {
            vec![prompt]
        })
    }

    async fn on_name(
        &self,
        inbound: &Inbound,
        session: RegistrationSession,
    ) -> Result<Vec<Reply>, FlowError> {
        let texts = &self.ctx.texts;
        let lang = inbound.user.language();

        let name = match inbound.text.as_deref().map(validate_name) {
            Some(Ok(name)) => name,
            Some(Err(InputError::TooLong)) => {
                return Ok(vec![Reply::text(texts.text("name-too-long", lang), Keyboard::Keep)]);
            }
            _ => return Ok(vec![Reply::text(texts.text("name-invalid", lang), Keyboard::Keep)]),
        };

        self.write(inbound.user.id, UserField::Name(name)).await?;
        self.advance(inbound.user.id, session).await?;

        Ok(vec![Reply::text(
            texts.text("phone-prompt", lang),
            keyboards::phone_request(texts, lang, true),
        )])
    }

    async fn on_phone(
        &self,
        inbound: &Inbound,
        session: RegistrationSession,
    ) -> Result<Vec<Reply>, FlowError> {
        let texts = &self.ctx.texts;
        let lang = inbound.user.language();

        let Some(phone) = inbound.contact_phone.clone() else {
            return Ok(vec![Reply::text(
                texts.text("phone-invalid", lang),
                keyboards::phone_request(texts, lang, false),
            )]);
        };

        self.write(inbound.user.id, UserField::Phone(phone)).await?;
        self.advance(inbound.user.id, session).await?;

        Ok(vec![Reply::text(
            texts.text("english-level-prompt", lang),
            keyboards::english_levels(&self.ctx.config.english_levels, true),
        )])
    }

    async fn on_english_level(
        &self,
        inbound: &Inbound,
        session: RegistrationSession,
    ) -> Result<Vec<Reply>, FlowError> {
        let texts = &self.ctx.texts;
        let lang = inbound.user.language();
        let levels = &self.ctx.config.english_levels;

        let answer = inbound.text.as_deref().unwrap_or_default();
        let level = match validate_choice(answer, levels) {
            Ok(level) => level.to_string(),
            Err(_) => {
                return Ok(vec![Reply::text(
                    texts.text("choose-from-buttons", lang),
                    keyboards::english_levels(levels, false),
                )]);
            }
        };

        self.write(inbound.user.id, UserField::EnglishLevel(level)).await?;
        self.advance(inbound.user.id, session).await?;

        Ok(vec![Reply::text(
            texts.text("age-prompt", lang),
            keyboards::age_brackets(&self.ctx.config.age_brackets, true),
        )])
    }

    async fn on_age(&self, inbound: &Inbound) -> Result<Vec<Reply>, FlowError> {
        let texts = &self.ctx.texts;
        let lang = inbound.user.language();
        let brackets = &self.ctx.config.age_brackets;

        let answer = inbound.text.as_deref().unwrap_or_default();
        let age = match validate_choice(answer, brackets) {
            Ok(age) => age.to_string(),
            Err(_) => {
                return Ok(vec![Reply::text(
                    texts.text("choose-from-buttons", lang),
                    keyboards::age_brackets(brackets, false),
                )]);
            }
        };

        self.write(inbound.user.id, UserField::Age(age)).await?;
        self.sessions.exit(inbound.user.id).await?;
        info!(user_id = %inbound.user.id, "Registration completed");

        Ok(self.completion(lang).await)
    }

    /// Confirmation, region picker, then the final message with the main menu
    async fn completion(&self, lang: Option<&str>) -> Vec<Reply> {
        let texts = &self.ctx.texts;
        let delay = self.ctx.config.step_delay;

        let mut replies = vec![Reply::text(
            texts.text("registration-confirmed", lang),
            Keyboard::Remove,
        )];
        let confirmation = 0;

        match self.ctx.backend.list_regions(false).await {
            Ok(regions) if !regions.is_empty() => {
                replies.push(Reply::Pause(delay));
                replies.push(Reply::text(
                    texts.text("region-prompt", lang),
                    keyboards::regions(&regions, PickPurpose::Registration),
                ));
            }
            Ok(_) => warn!("Backend returned no regions, skipping region prompt"),
            Err(e) => warn!(error = %e, "Failed to load regions, skipping region prompt"),
        }

        replies.push(Reply::Pause(delay));
        replies.push(Reply::DeleteSent(confirmation));
        replies.push(Reply::text(
            texts.text("registration-complete", lang),
            keyboards::main_menu(texts, lang),
        ));
        replies
    }

    async fn write(&self, user: UserId, field: UserField) -> Result<(), FlowError> {
        self.ctx.backend.update_user(user, &field).await?;
        info!(user_id = %user, field = field.key(), "Registration field saved");
        Ok(())
    }

    async fn advance(&self, user: UserId, session: RegistrationSession) -> Result<(), FlowError> {
        if let Some(next) = session.step.next() {
            self.sessions.update(user, session.at(next)).await?;
        }
        Ok(())
    }
}
