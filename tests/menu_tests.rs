//! # Menu and Ticketing Tests
//!
//! Main menu commands and the region/district callbacks, driven through [`App`].

mod common;

use common::*;
use debate_bot::backend::{DebateFilter, UserField};
use debate_bot::config::BotConfig;
use debate_bot::inbound::Inbound;
use debate_bot::keyboards::{self, InlineAction, Keyboard};
use debate_bot::reply::Reply;

const EN_DEBATES: &str = "👀 Upcoming debates";
const UZ_DEBATES: &str = "👀 Kelasi debatlar";
const EN_REGISTER: &str = "📝 Register for a debate";

fn ticketing_config() -> BotConfig {
    BotConfig {
        ticketing_enabled: true,
        ..test_config()
    }
}

#[tokio::test]
async fn test_upcoming_debates_lists_only_future_debates() {
    let harness = Harness::new(
        FakeBackend::new().with_debates(vec![
            debate(1, "Tashkent", "Chilanzar", false),
            debate(2, "Bukhara", "Gijduvan", true),
            debate(3, "Samarkand", "Urgut", false),
        ]),
        FakeMembership::joined_all(),
    );

    let replies = harness.app.on_message(&text(EN_DEBATES)).await;

    assert_eq!(
        replies,
        vec![Reply::text(
            concat!(
                "Here is the list of our upcoming debates:\n\n",
                "1. Tashkent - Chilanzar\n",
                "2. Samarkand - Urgut\n",
            ),
            keyboards::main_menu(&harness.texts, Some("en")),
        )]
    );
    assert_eq!(
        harness.backend.calls(),
        vec![BackendCall::ListDebates(DebateFilter::default())]
    );
}

#[tokio::test]
async fn test_upcoming_debates_empty_list_shows_header_only() {
    let harness = Harness::new(FakeBackend::new(), FakeMembership::joined_all());

    let replies = harness.app.on_message(&text(EN_DEBATES)).await;

    let expected = format!("{}\n\n", harness.en("debates-header"));
    assert_eq!(replies[0].body(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_menu_labels_match_in_any_language() {
    let harness = Harness::new(
        FakeBackend::new().with_debates(vec![debate(1, "Tashkent", "Chilanzar", false)]),
        FakeMembership::joined_all(),
    );

    // an English-speaking user pressing a button left over from the Uzbek menu
    let replies = harness.app.on_message(&text(UZ_DEBATES)).await;

    let body = replies[0].body().unwrap_or_default();
    assert!(body.starts_with(&harness.en("debates-header")));
    assert!(body.ends_with("1. Tashkent - Chilanzar\n"));
}

#[tokio::test]
async fn test_users_without_language_get_uzbek() {
    let harness = Harness::new(FakeBackend::new(), FakeMembership::joined_all());
    let mut profile = user();
    profile.language_code = None;

    let replies = harness.app.on_message(&Inbound::text(profile, UZ_DEBATES)).await;

    let expected = format!("{}\n\n", harness.texts.text("debates-header", Some("uz")));
    assert_eq!(replies[0].body(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_debates_backend_failure_asks_to_retry() {
    let harness = Harness::new(FakeBackend::new(), FakeMembership::joined_all());
    harness.backend.set_fail_reads(true);

    let replies = harness.app.on_message(&text(EN_DEBATES)).await;

    assert_eq!(
        replies,
        vec![Reply::text(harness.en("error-try-again"), Keyboard::Keep)]
    );
}

#[tokio::test]
async fn test_unknown_text_gets_menu_hint() {
    let harness = Harness::new(FakeBackend::new(), FakeMembership::joined_all());

    let replies = harness.app.on_message(&text("hello")).await;

    assert_eq!(
        replies,
        vec![Reply::text(
            harness.en("menu-hint"),
            keyboards::main_menu(&harness.texts, Some("en")),
        )]
    );
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn test_register_for_debate_without_upcoming_regions() {
    let harness = Harness::new(FakeBackend::new(), FakeMembership::joined_all());

    let replies = harness.app.on_message(&text(EN_REGISTER)).await;

    assert_eq!(replies[0].body(), Some(harness.en("no-upcoming-debates").as_str()));
    assert_eq!(harness.backend.calls(), vec![BackendCall::ListRegions(true)]);
}

#[tokio::test]
async fn test_register_for_debate_offers_ticket_regions() {
    let harness = Harness::new(
        FakeBackend::new().with_regions(vec![region(1, "Tashkent"), region(4, "Navoi")]),
        FakeMembership::joined_all(),
    );

    let replies = harness.app.on_message(&text(EN_REGISTER)).await;

    assert_eq!(replies[0].body(), Some(harness.en("ticket-region-prompt").as_str()));
    let Reply::Text { keyboard, .. } = &replies[0] else {
        panic!("expected a text reply");
    };
    let rows = keyboard.inline_rows().expect("inline region picker");
    assert_eq!(
        rows[0][1].action,
        InlineAction::Callback("region:4:get_ticket".to_string())
    );
}

#[tokio::test]
async fn test_picks_are_unavailable_when_ticketing_is_off() {
    let harness = Harness::new(FakeBackend::new(), FakeMembership::joined_all());

    for data in ["region:1:reg", "region:1:get_ticket", "district:3:reg", "district:3:get_ticket"] {
        let outcome = harness.app.on_callback(&user(), data).await;
        assert!(outcome.replies.is_empty());
        assert_eq!(outcome.notice, Some(harness.en("feature-unavailable")));
    }
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_callback_is_ignored() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new(),
        FakeMembership::joined_all(),
    );

    let outcome = harness.app.on_callback(&user(), "edit_3").await;

    assert!(outcome.replies.is_empty());
    assert!(outcome.notice.is_none());
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn test_region_pick_for_profile_saves_region() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new().with_districts(vec![
            district(10, "Chilanzar", None),
            district(11, "Yunusabad", None),
        ]),
        FakeMembership::joined_all(),
    );

    let outcome = harness.app.on_callback(&user(), "region:1:reg").await;

    assert_eq!(
        harness.backend.calls(),
        vec![
            BackendCall::Update(USER_ID, UserField::Region(1)),
            BackendCall::ListDistricts(1, false),
        ]
    );
    let Reply::EditOrigin { text, keyboard } = &outcome.replies[0] else {
        panic!("expected the picker to be edited");
    };
    assert_eq!(text, &harness.en("district-prompt"));
    assert_eq!(
        keyboard[0][1].action,
        InlineAction::Callback("district:11:reg".to_string())
    );
}

#[tokio::test]
async fn test_district_pick_for_profile_finishes_registration() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new(),
        FakeMembership::joined_all(),
    );

    let outcome = harness.app.on_callback(&user(), "district:11:reg").await;

    assert_eq!(
        harness.backend.writes(),
        vec![BackendCall::Update(USER_ID, UserField::District(11))]
    );
    assert_eq!(
        outcome.replies,
        vec![
            Reply::DeleteOrigin,
            Reply::text(
                harness.en("registration-complete"),
                keyboards::main_menu(&harness.texts, Some("en")),
            ),
        ]
    );
}

#[tokio::test]
async fn test_region_pick_for_ticket_lists_upcoming_districts() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new().with_districts(vec![district(10, "Chilanzar", None)]),
        FakeMembership::joined_all(),
    );

    let outcome = harness.app.on_callback(&user(), "region:1:get_ticket").await;

    assert!(harness.backend.writes().is_empty());
    assert!(harness.backend.calls().contains(&BackendCall::ListDistricts(1, true)));
    assert_eq!(
        outcome.replies[0].body(),
        Some(harness.en("ticket-district-prompt").as_str())
    );
}

#[tokio::test]
async fn test_district_pick_for_ticket_issues_ticket() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new()
            .with_districts(vec![district(10, "Chilanzar", Some("https://t.me/+chilanzar"))])
            .with_debates(vec![
                debate(7, "Tashkent", "Chilanzar", true),
                debate(8, "Tashkent", "Chilanzar", false),
            ]),
        FakeMembership::joined_all(),
    );

    let outcome = harness.app.on_callback(&user(), "district:10:get_ticket").await;

    assert!(harness.backend.calls().contains(&BackendCall::ListDebates(DebateFilter {
        district: Some(10),
        upcoming_only: true,
    })));
    assert!(harness
        .backend
        .calls()
        .contains(&BackendCall::CreateTicket(8, USER_ID)));

    let [Reply::Photo { url, caption, fallback }] = outcome.replies.as_slice() else {
        panic!("expected a single photo, got {:?}", outcome.replies);
    };
    assert_eq!(url, "http://backend.test/media/qr/8-998901.png");
    assert!(caption.contains("https://t.me/+chilanzar"));
    assert!(fallback.contains("https://t.me/+chilanzar"));
}

#[tokio::test]
async fn test_district_without_upcoming_debate_gets_notice() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new().with_debates(vec![debate(7, "Tashkent", "Chilanzar", true)]),
        FakeMembership::joined_all(),
    );

    let outcome = harness.app.on_callback(&user(), "district:10:get_ticket").await;

    assert!(outcome.replies.is_empty());
    assert_eq!(outcome.notice, Some(harness.en("no-upcoming-debates")));
    assert!(harness.backend.writes().is_empty());
}

#[tokio::test]
async fn test_failed_pick_answers_with_retry_notice() {
    let harness = Harness::with_config(
        ticketing_config(),
        FakeBackend::new(),
        FakeMembership::joined_all(),
    );
    harness.backend.set_fail_writes(true);

    let outcome = harness.app.on_callback(&user(), "region:1:reg").await;

    assert!(outcome.replies.is_empty());
    assert_eq!(outcome.notice, Some(harness.en("error-try-again")));
}
