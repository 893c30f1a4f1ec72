//! Platform-independent view of who wrote and what they sent.

use teloxide::types::{User, UserId};

use crate::backend::NewUser;

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
}

impl UserProfile {
    pub fn language(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    /// Backend record for this user; missing usernames fall back to the id and
    /// missing last names to an empty string
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            id: self.id.0.to_string(),
            username: self
                .username
                .clone()
                .unwrap_or_else(|| self.id.0.to_string()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone().unwrap_or_default(),
            language_code: self.language_code.clone(),
        }
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            language_code: user.language_code.clone(),
        }
    }
}

/// An incoming message reduced to what the flows look at
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub user: UserProfile,
    pub text: Option<String>,
    /// Phone number of an attached contact
    pub contact_phone: Option<String>,
}

impl Inbound {
    pub fn text(user: UserProfile, text: impl Into<String>) -> Self {
        Self {
            user,
            text: Some(text.into()),
            contact_phone: None,
        }
    }

    pub fn contact(user: UserProfile, phone: impl Into<String>) -> Self {
        Self {
            user,
            text: None,
            contact_phone: Some(phone.into()),
        }
    }

    /// Whether the message is the `/start` command, with or without a payload
    pub fn is_start_command(&self) -> bool {
        self.text
            .as_deref()
            .and_then(|text| text.split_whitespace().next())
            .is_some_and(|command| command == "/start" || command.starts_with("/start@"))
    }
}
