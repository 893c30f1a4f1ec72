//! Region and district pickers: finishing the profile location after
//! registration, and issuing debate tickets.
//!
//! Everything here is switched off unless `TICKETING_ENABLED` is set.

use tracing::{info, warn};

use crate::app::BotContext;
use crate::backend::{DebateFilter, UserField};
use crate::errors::FlowError;
use crate::inbound::UserProfile;
use crate::keyboards::{self, PickPurpose};
use crate::reply::{CallbackOutcome, Reply};

/// Answer for picks made while the feature is switched off
pub fn unavailable(ctx: &BotContext, user: &UserProfile) -> CallbackOutcome {
    CallbackOutcome {
        replies: Vec::new(),
        notice: Some(ctx.texts.text("feature-unavailable", user.language())),
    }
}

pub async fn select_region(
    ctx: &BotContext,
    user: &UserProfile,
    region_id: i64,
    purpose: PickPurpose,
) -> Result<CallbackOutcome, FlowError> {
    let lang = user.language();

    let (prompt, upcoming_only) = match purpose {
        PickPurpose::Registration => {
            ctx.backend
                .update_user(user.id, &UserField::Region(region_id))
                .await?;
            info!(user_id = %user.id, region_id, "Region saved");
            ("district-prompt", false)
        }
        PickPurpose::Ticket => ("ticket-district-prompt", true),
    };

    let districts = ctx.backend.list_districts(region_id, upcoming_only).await?;
    Ok(vec![Reply::EditOrigin {
        text: ctx.texts.text(prompt, lang),
        keyboard: keyboards::districts(&districts, purpose),
    }]
    .into())
}

pub async fn select_district(
    ctx: &BotContext,
    user: &UserProfile,
    district_id: i64,
    purpose: PickPurpose,
) -> Result<CallbackOutcome, FlowError> {
    match purpose {
        PickPurpose::Registration => save_district(ctx, user, district_id).await,
        PickPurpose::Ticket => issue_ticket(ctx, user, district_id).await,
    }
}

async fn save_district(
    ctx: &BotContext,
    user: &UserProfile,
    district_id: i64,
) -> Result<CallbackOutcome, FlowError> {
    let lang = user.language();

    ctx.backend
        .update_user(user.id, &UserField::District(district_id))
        .await?;
    info!(user_id = %user.id, district_id, "District saved");

    Ok(vec![
        Reply::DeleteOrigin,
        Reply::text(
            ctx.texts.text("registration-complete", lang),
            keyboards::main_menu(&ctx.texts, lang),
        ),
    ]
    .into())
}

async fn issue_ticket(
    ctx: &BotContext,
    user: &UserProfile,
    district_id: i64,
) -> Result<CallbackOutcome, FlowError> {
    let lang = user.language();

    let filter = DebateFilter {
        district: Some(district_id),
        upcoming_only: true,
    };
    let debates = ctx.backend.list_debates(filter).await?;
    let Some(debate) = debates.iter().find(|debate| !debate.is_passed) else {
        return Ok(CallbackOutcome {
            replies: Vec::new(),
            notice: Some(ctx.texts.text("no-upcoming-debates", lang)),
        });
    };

    let ticket = ctx.backend.create_ticket(debate.id, user.id).await?;
    info!(user_id = %user.id, debate_id = debate.id, "Ticket issued");

    let group_link = match ctx.backend.get_district(district_id).await {
        Ok(district) => district.telegram_group_link.unwrap_or_default(),
        Err(e) => {
            warn!(district_id, error = %e, "Failed to load district group link");
            String::new()
        }
    };
    let args = [("group_link", group_link.as_str())];

    Ok(vec![Reply::Photo {
        url: media_url(ctx, &ticket.qr_code),
        caption: ctx.texts.text_args("ticket-issued", &args, lang),
        fallback: ctx.texts.text_args("ticket-issued-fallback", &args, lang),
    }]
    .into())
}

/// Absolute URL of a media path returned by the backend
pub fn media_url(ctx: &BotContext, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let relative = path.trim_start_matches('/').trim_start_matches("media/");
    match ctx.config.media_url.join(relative) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{relative}", ctx.config.media_url),
    }
}
