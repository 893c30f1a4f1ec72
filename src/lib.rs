//! # Debate Registration Bot
//!
//! A Telegram bot that gates registration behind channel subscriptions,
//! collects a participant profile step by step and stores it in the debate
//! club's REST backend. Registered users get a menu to browse upcoming debates.

pub mod app;
pub mod backend;
pub mod bot;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod inbound;
pub mod keyboards;
pub mod localization;
pub mod menu;
pub mod registration;
pub mod reply;
pub mod subscription;
pub mod ticketing;

pub use app::{App, BotContext};
pub use config::BotConfig;
pub use errors::{BackendError, ConfigError, FlowError, MembershipError};
