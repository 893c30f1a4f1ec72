//! Registration dialogue state: steps, per-user sessions and input validation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{InMemStorage, InMemStorageError, Storage};
use teloxide::types::{ChatId, UserId};

/// Maximum accepted length of a full name, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// Where a user is in the registration flow.
///
/// Steps only ever move forward; completing [`RegistrationStep::AwaitingAge`]
/// ends the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegistrationStep {
    /// Blocked by the subscription gate
    #[default]
    AwaitingSubscription,
    AwaitingName,
    AwaitingPhone,
    AwaitingEnglishLevel,
    AwaitingAge,
}

impl RegistrationStep {
    /// The step that follows a successful answer, `None` once registration is complete
    pub fn next(self) -> Option<Self> {
        match self {
            RegistrationStep::AwaitingSubscription => Some(RegistrationStep::AwaitingName),
            RegistrationStep::AwaitingName => Some(RegistrationStep::AwaitingPhone),
            RegistrationStep::AwaitingPhone => Some(RegistrationStep::AwaitingEnglishLevel),
            RegistrationStep::AwaitingEnglishLevel => Some(RegistrationStep::AwaitingAge),
            RegistrationStep::AwaitingAge => None,
        }
    }
}

/// Transient per-user registration state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSession {
    pub step: RegistrationStep,
    pub is_subscribed: bool,
}

impl RegistrationSession {
    /// Session of a user still blocked by the subscription gate
    pub fn gated() -> Self {
        Self {
            step: RegistrationStep::AwaitingSubscription,
            is_subscribed: false,
        }
    }

    /// Session of a user who passed the gate and is asked for their name
    pub fn subscribed() -> Self {
        Self {
            step: RegistrationStep::AwaitingName,
            is_subscribed: true,
        }
    }

    /// Same session moved to `step`
    pub fn at(self, step: RegistrationStep) -> Self {
        Self { step, ..self }
    }
}

/// Registration sessions in teloxide's in-memory dialogue storage.
///
/// Registration only happens in private chats, so a user's session lives under
/// the chat id equal to their user id.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<InMemStorage<RegistrationSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_storage(InMemStorage::new())
    }

    /// Use a storage shared with other dialogue users
    pub fn with_storage(storage: Arc<InMemStorage<RegistrationSession>>) -> Self {
        Self { storage }
    }

    pub async fn get(
        &self,
        user: UserId,
    ) -> Result<Option<RegistrationSession>, InMemStorageError> {
        Arc::clone(&self.storage).get_dialogue(ChatId::from(user)).await
    }

    /// Create or replace the session of `user`
    pub async fn update(
        &self,
        user: UserId,
        session: RegistrationSession,
    ) -> Result<(), InMemStorageError> {
        Arc::clone(&self.storage)
            .update_dialogue(ChatId::from(user), session)
            .await
    }

    /// End the session of `user`; ending a missing session is not an error
    pub async fn exit(&self, user: UserId) -> Result<(), InMemStorageError> {
        match Arc::clone(&self.storage).remove_dialogue(ChatId::from(user)).await {
            Err(InMemStorageError::DialogueNotFound) => Ok(()),
            other => other,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Why an answer was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputError {
    Empty,
    TooLong,
    NotAChoice,
}

/// Validates a full name input
pub fn validate_name(name: &str) -> Result<String, InputError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(InputError::TooLong);
    }

    Ok(trimmed.to_string())
}

/// Accepts `input` only if it is exactly one of `choices`
pub fn validate_choice<'a>(input: &str, choices: &'a [String]) -> Result<&'a str, InputError> {
    choices
        .iter()
        .find(|choice| choice.as_str() == input)
        .map(String::as_str)
        .ok_or(InputError::NotAChoice)
}
