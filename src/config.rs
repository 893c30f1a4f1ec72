//! # Configuration Module
//!
//! This module defines the bot configuration: backend location, the channels a
//! user has to join before registering, the fixed answer sets for the
//! registration keyboards and presentation timings.

use std::time::Duration;

use reqwest::Url;
use teloxide::types::ChatId;

use crate::errors::ConfigError;

// Defaults used when the corresponding variable is not set
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_ENGLISH_LEVELS: &[&str] = &["B1-B2", "C1-C2"];
pub const DEFAULT_AGE_BRACKETS: &[&str] = &["<16", "16-18", "19-24", ">24"];
pub const DEFAULT_SOCIAL_LABEL: &str = "Ibrat Debate Instagram";
pub const DEFAULT_SOCIAL_LINK: &str = "https://instagram.com/ibrat.debate";
pub const DEFAULT_STEP_DELAY_MS: u64 = 500;
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

/// A channel the user must be subscribed to
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: ChatId,
    pub name: String,
    pub link: Url,
}

/// The always-present social link on the join prompt
#[derive(Debug, Clone, PartialEq)]
pub struct SocialLink {
    pub label: String,
    pub link: Url,
}

/// Full bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub bot_token: String,
    /// REST backend base URL, always ending in `/`
    pub backend_url: Url,
    /// Base URL for relative media paths such as ticket QR codes
    pub media_url: Url,
    /// Channels gating registration, in display order
    pub channels: Vec<Channel>,
    /// Accepted English levels
    pub english_levels: Vec<String>,
    /// Accepted age brackets
    pub age_brackets: Vec<String>,
    pub social: SocialLink,
    /// Pause between the messages of a timed reply sequence
    pub step_delay: Duration,
    /// Per-request timeout for backend calls
    pub backend_timeout: Duration,
    /// Enables region, district and ticket callbacks
    pub ticketing_enabled: bool,
}

impl BotConfig {
    /// A fully-populated configuration with no token and no channels
    pub fn defaults() -> Result<Self, ConfigError> {
        let backend_url = parse_base_url("BACKEND_URL", DEFAULT_BACKEND_URL)?;
        Ok(Self {
            bot_token: String::new(),
            media_url: default_media_url(&backend_url),
            backend_url,
            channels: Vec::new(),
            english_levels: DEFAULT_ENGLISH_LEVELS.iter().map(|s| s.to_string()).collect(),
            age_brackets: DEFAULT_AGE_BRACKETS.iter().map(|s| s.to_string()).collect(),
            social: SocialLink {
                label: DEFAULT_SOCIAL_LABEL.to_string(),
                link: parse_url("SOCIAL_LINK", DEFAULT_SOCIAL_LINK)?,
            },
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            ticketing_enabled: false,
        })
    }

    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::defaults()?;

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let backend_url = match get("BACKEND_URL") {
            Some(raw) => parse_base_url("BACKEND_URL", &raw)?,
            None => defaults.backend_url,
        };
        let media_url = match get("MEDIA_URL") {
            Some(raw) => parse_base_url("MEDIA_URL", &raw)?,
            None => default_media_url(&backend_url),
        };

        let channels = match get("CHANNELS") {
            Some(raw) => parse_channels(&raw)?,
            None => Vec::new(),
        };

        let english_levels = match get("ENGLISH_LEVELS") {
            Some(raw) => parse_choice_set("ENGLISH_LEVELS", &raw)?,
            None => defaults.english_levels,
        };
        let age_brackets = match get("AGE_BRACKETS") {
            Some(raw) => parse_choice_set("AGE_BRACKETS", &raw)?,
            None => defaults.age_brackets,
        };

        let social = SocialLink {
            label: get("SOCIAL_LABEL").unwrap_or(defaults.social.label),
            link: match get("SOCIAL_LINK") {
                Some(raw) => parse_url("SOCIAL_LINK", &raw)?,
                None => defaults.social.link,
            },
        };

        let step_delay = match get("STEP_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("STEP_DELAY_MS", &raw)?),
            None => defaults.step_delay,
        };
        let backend_timeout = match get("BACKEND_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("BACKEND_TIMEOUT_SECS", &raw)?),
            None => defaults.backend_timeout,
        };

        let ticketing_enabled = match get("TICKETING_ENABLED") {
            Some(raw) => parse_flag("TICKETING_ENABLED", &raw)?,
            None => false,
        };

        Ok(Self {
            bot_token,
            backend_url,
            media_url,
            channels,
            english_levels,
            age_brackets,
            social,
            step_delay,
            backend_timeout,
            ticketing_enabled,
        })
    }
}

/// Parse `id|name|link` channel entries separated by `;`
pub fn parse_channels(raw: &str) -> Result<Vec<Channel>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "CHANNELS",
        reason,
    };

    let mut channels: Vec<Channel> = Vec::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.splitn(3, '|').map(str::trim);
        let (Some(id), Some(name), Some(link)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid(format!("expected id|name|link, got `{entry}`")));
        };

        let id: i64 = id
            .parse()
            .map_err(|_| invalid(format!("channel id `{id}` is not an integer")))?;
        if name.is_empty() {
            return Err(invalid(format!("channel {id} has an empty name")));
        }
        let link = Url::parse(link)
            .map_err(|e| invalid(format!("channel {id} has an invalid link: {e}")))?;

        if channels.iter().any(|c| c.id.0 == id) {
            return Err(invalid(format!("channel {id} is listed twice")));
        }

        channels.push(Channel {
            id: ChatId(id),
            name: name.to_string(),
            link,
        });
    }

    Ok(channels)
}

fn parse_choice_set(key: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let choices: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if choices.is_empty() {
        return Err(ConfigError::Invalid {
            key,
            reason: "at least one choice is required".to_string(),
        });
    }
    Ok(choices)
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        reason: format!("`{raw}` is not a non-negative integer"),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("`{other}` is not a boolean"),
        }),
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

// Relative joins only work against a base whose path ends in `/`
fn parse_base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        parse_url(key, raw)
    } else {
        parse_url(key, &format!("{raw}/"))
    }
}

fn default_media_url(backend_url: &Url) -> Url {
    backend_url
        .join("media/")
        .unwrap_or_else(|_| backend_url.clone())
}
