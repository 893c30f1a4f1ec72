//! Main menu commands, available whenever no registration is in progress.

use tracing::info;

use crate::app::BotContext;
use crate::backend::{Debate, DebateFilter};
use crate::errors::FlowError;
use crate::keyboards::{self, Keyboard, PickPurpose};
use crate::localization::LocalizationManager;
use crate::reply::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// List upcoming debates
    UpcomingDebates,
    /// Pick a region to get a debate ticket
    RegisterForDebate,
}

impl MenuCommand {
    /// Match a main menu button label in any supported language
    pub fn parse(text: &str, texts: &LocalizationManager) -> Option<Self> {
        if texts.matches_any("menu-upcoming-debates", text) {
            Some(MenuCommand::UpcomingDebates)
        } else if texts.matches_any("menu-register-debate", text) {
            Some(MenuCommand::RegisterForDebate)
        } else {
            None
        }
    }
}

/// Header followed by one `"{i}. {region} - {district}"` line per debate
pub fn render_debates(header: &str, debates: &[Debate]) -> String {
    let mut text = format!("{header}\n\n");
    for (i, debate) in debates.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} - {}\n",
            i + 1,
            debate.region.name,
            debate.district.name
        ));
    }
    text
}

pub async fn dispatch(
    ctx: &BotContext,
    command: MenuCommand,
    language_code: Option<&str>,
) -> Result<Vec<Reply>, FlowError> {
    match command {
        MenuCommand::UpcomingDebates => upcoming_debates(ctx, language_code).await,
        MenuCommand::RegisterForDebate => register_for_debate(ctx, language_code).await,
    }
}

pub async fn upcoming_debates(
    ctx: &BotContext,
    language_code: Option<&str>,
) -> Result<Vec<Reply>, FlowError> {
    let debates: Vec<Debate> = ctx
        .backend
        .list_debates(DebateFilter::default())
        .await?
        .into_iter()
        .filter(|debate| !debate.is_passed)
        .collect();
    info!(count = debates.len(), "Listing upcoming debates");

    let text = render_debates(&ctx.texts.text("debates-header", language_code), &debates);
    Ok(vec![Reply::text(
        text,
        keyboards::main_menu(&ctx.texts, language_code),
    )])
}

/// Region picker limited to regions with upcoming debates
pub async fn register_for_debate(
    ctx: &BotContext,
    language_code: Option<&str>,
) -> Result<Vec<Reply>, FlowError> {
    let regions = ctx.backend.list_regions(true).await?;

    if regions.is_empty() {
        return Ok(vec![Reply::text(
            ctx.texts.text("no-upcoming-debates", language_code),
            keyboards::main_menu(&ctx.texts, language_code),
        )]);
    }

    Ok(vec![Reply::text(
        ctx.texts.text("ticket-region-prompt", language_code),
        keyboards::regions(&regions, PickPurpose::Ticket),
    )])
}

/// Reply to free text that is neither a registration answer nor a menu command
pub fn hint(ctx: &BotContext, language_code: Option<&str>) -> Vec<Reply> {
    vec![Reply::text(
        ctx.texts.text("menu-hint", language_code),
        keyboards::main_menu(&ctx.texts, language_code),
    )]
}

/// Generic "try again" reply for a failed step
pub fn try_again(ctx: &BotContext, language_code: Option<&str>) -> Reply {
    Reply::text(ctx.texts.text("error-try-again", language_code), Keyboard::Keep)
}
