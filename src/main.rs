use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use debate_bot::backend::HttpBackend;
use debate_bot::bot::{self, TelegramMembership};
use debate_bot::localization::LocalizationManager;
use debate_bot::{App, BotConfig, BotContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting debate registration bot");

    let config = Arc::new(BotConfig::from_env()?);
    info!(
        backend = %config.backend_url,
        channels = config.channels.len(),
        ticketing = config.ticketing_enabled,
        "Configuration loaded"
    );

    let texts = LocalizationManager::new()?;
    let backend = HttpBackend::new(config.backend_url.clone(), config.backend_timeout)?;
    let bot = Bot::new(&config.bot_token);

    let ctx = BotContext {
        config: Arc::clone(&config),
        backend: Arc::new(backend),
        membership: Arc::new(TelegramMembership::new(bot.clone())),
        texts: Arc::new(texts),
    };
    let app = Arc::new(App::new(ctx));

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// `RUST_LOG` picks the filter (default `info`); `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
