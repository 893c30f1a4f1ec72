//! Shared fakes and fixtures for flow tests.
//!
//! `FakeBackend` records every call and serves canned data; `FakeMembership`
//! answers membership lookups from a per-channel table.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use teloxide::types::{ChatId, UserId};

use debate_bot::backend::{
    Backend, Debate, DebateFilter, District, Named, NewUser, Region, Ticket, UserField,
};
use debate_bot::config::{BotConfig, Channel};
use debate_bot::errors::{BackendError, MembershipError};
use debate_bot::inbound::{Inbound, UserProfile};
use debate_bot::localization::LocalizationManager;
use debate_bot::subscription::{MembershipChecker, MembershipStatus};
use debate_bot::{App, BotContext};

pub const USER_ID: UserId = UserId(998_901);
pub const NEWS_CHANNEL: ChatId = ChatId(-1_001_111);
pub const CLUB_CHANNEL: ChatId = ChatId(-1_002_222);

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Upsert(NewUser),
    Update(UserId, UserField),
    ListDebates(DebateFilter),
    ListRegions(bool),
    ListDistricts(i64, bool),
    GetDistrict(i64),
    CreateTicket(i64, UserId),
}

impl BackendCall {
    pub fn is_write(&self) -> bool {
        matches!(self, BackendCall::Upsert(_) | BackendCall::Update(..))
    }
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<BackendCall>>,
    pub regions: Mutex<Vec<Region>>,
    pub districts: Mutex<Vec<District>>,
    pub debates: Mutex<Vec<Debate>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions(self, regions: Vec<Region>) -> Self {
        *self.regions.lock().unwrap() = regions;
        self
    }

    pub fn with_districts(self, districts: Vec<District>) -> Self {
        *self.districts.lock().unwrap() = districts;
        self
    }

    pub fn with_debates(self, debates: Vec<Debate>) -> Self {
        *self.debates.lock().unwrap() = debates;
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<BackendCall> {
        self.calls().into_iter().filter(BackendCall::is_write).collect()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self) -> Result<(), BackendError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    fn read_result(&self) -> Result<(), BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

fn unavailable() -> BackendError {
    BackendError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        url: "http://backend.test/".to_string(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upsert_user(&self, user: &NewUser) -> Result<(), BackendError> {
        self.record(BackendCall::Upsert(user.clone()));
        self.write_result()
    }

    async fn update_user(&self, user_id: UserId, field: &UserField) -> Result<(), BackendError> {
        self.record(BackendCall::Update(user_id, field.clone()));
        self.write_result()
    }

    async fn list_debates(&self, filter: DebateFilter) -> Result<Vec<Debate>, BackendError> {
        self.record(BackendCall::ListDebates(filter));
        self.read_result()?;
        Ok(self.debates.lock().unwrap().clone())
    }

    async fn list_regions(&self, upcoming_only: bool) -> Result<Vec<Region>, BackendError> {
        self.record(BackendCall::ListRegions(upcoming_only));
        self.read_result()?;
        Ok(self.regions.lock().unwrap().clone())
    }

    async fn list_districts(
        &self,
        region_id: i64,
        upcoming_only: bool,
    ) -> Result<Vec<District>, BackendError> {
        self.record(BackendCall::ListDistricts(region_id, upcoming_only));
        self.read_result()?;
        Ok(self.districts.lock().unwrap().clone())
    }

    async fn get_district(&self, district_id: i64) -> Result<District, BackendError> {
        self.record(BackendCall::GetDistrict(district_id));
        self.read_result()?;
        self.districts
            .lock()
            .unwrap()
            .iter()
            .find(|district| district.id == district_id)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn create_ticket(&self, debate_id: i64, user_id: UserId) -> Result<Ticket, BackendError> {
        self.record(BackendCall::CreateTicket(debate_id, user_id));
        self.write_result()?;
        Ok(Ticket {
            qr_code: format!("/media/qr/{debate_id}-{}.png", user_id.0),
        })
    }
}

/// Membership table; channels missing from it fail the lookup
#[derive(Default)]
pub struct FakeMembership {
    statuses: Mutex<HashMap<ChatId, MembershipStatus>>,
    lookups: Mutex<usize>,
}

impl FakeMembership {
    pub fn joined_all() -> Self {
        let fake = Self::default();
        fake.set(NEWS_CHANNEL, MembershipStatus::Member);
        fake.set(CLUB_CHANNEL, MembershipStatus::Member);
        fake
    }

    pub fn set(&self, channel: ChatId, status: MembershipStatus) {
        self.statuses.lock().unwrap().insert(channel, status);
    }

    pub fn forget(&self, channel: ChatId) {
        self.statuses.lock().unwrap().remove(&channel);
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl MembershipChecker for FakeMembership {
    async fn membership(
        &self,
        channel: ChatId,
        _user: UserId,
    ) -> Result<MembershipStatus, MembershipError> {
        *self.lookups.lock().unwrap() += 1;
        self.statuses
            .lock()
            .unwrap()
            .get(&channel)
            .copied()
            .ok_or_else(|| MembershipError::Permission("member list is inaccessible".to_string()))
    }
}

pub fn channels() -> Vec<Channel> {
    vec![
        Channel {
            id: NEWS_CHANNEL,
            name: "Debate News".to_string(),
            link: Url::parse("https://t.me/debate_news").unwrap(),
        },
        Channel {
            id: CLUB_CHANNEL,
            name: "Debate Club".to_string(),
            link: Url::parse("https://t.me/debate_club").unwrap(),
        },
    ]
}

pub fn test_config() -> BotConfig {
    BotConfig {
        bot_token: "test-token".to_string(),
        media_url: Url::parse("http://backend.test/media/").unwrap(),
        channels: channels(),
        step_delay: Duration::from_millis(5),
        ..BotConfig::defaults().unwrap()
    }
}

pub struct Harness {
    pub app: App,
    pub backend: Arc<FakeBackend>,
    pub membership: Arc<FakeMembership>,
    pub texts: Arc<LocalizationManager>,
}

impl Harness {
    pub fn new(backend: FakeBackend, membership: FakeMembership) -> Self {
        Self::with_config(test_config(), backend, membership)
    }

    pub fn with_config(
        config: BotConfig,
        backend: FakeBackend,
        membership: FakeMembership,
    ) -> Self {
        let backend = Arc::new(backend);
        let membership = Arc::new(membership);
        let texts = Arc::new(LocalizationManager::new().unwrap());

        let ctx = BotContext {
            config: Arc::new(config),
            backend: backend.clone(),
            membership: membership.clone(),
            texts: texts.clone(),
        };

        Self {
            app: App::new(ctx),
            backend,
            membership,
            texts,
        }
    }

    /// English text of `key`
    pub fn en(&self, key: &str) -> String {
        self.texts.text(key, Some("en"))
    }
}

pub fn user() -> UserProfile {
    UserProfile {
        id: USER_ID,
        username: Some("ali_debater".to_string()),
        first_name: "Ali".to_string(),
        last_name: None,
        language_code: Some("en".to_string()),
    }
}

pub fn text(body: &str) -> Inbound {
    Inbound::text(user(), body)
}

pub fn contact(phone: &str) -> Inbound {
    Inbound::contact(user(), phone)
}

pub fn region(id: i64, name: &str) -> Region {
    Region {
        id,
        name: name.to_string(),
    }
}

pub fn district(id: i64, name: &str, group_link: Option<&str>) -> District {
    District {
        id,
        name: name.to_string(),
        telegram_group_link: group_link.map(str::to_string),
    }
}

pub fn debate(id: i64, region: &str, district: &str, is_passed: bool) -> Debate {
    Debate {
        id,
        region: Named {
            name: region.to_string(),
        },
        district: Named {
            name: district.to_string(),
        },
        is_passed,
    }
}
