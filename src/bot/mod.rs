//! Telegram side of the bot
//!
//! - `message_handler`: text and contact messages
//! - `callback_handler`: inline keyboard callback queries
//! - `membership`: channel membership lookups
//! - `render`: sends reply batches produced by [`crate::app::App`]
//! - `ui_builder`: keyboard layouts to Telegram markup

pub mod callback_handler;
pub mod membership;
pub mod message_handler;
pub mod render;
pub mod ui_builder;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

pub use callback_handler::callback_handler;
pub use membership::TelegramMembership;
pub use message_handler::message_handler;

/// Update routing tree; handlers expect an `Arc<App>` dependency
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}
