//! # Backend Module
//!
//! REST client for the registration backend. The [`Backend`] trait is the seam
//! the registration flow talks to; [`HttpBackend`] implements it with `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use teloxide::types::UserId;
use tracing::{debug, warn};

use crate::errors::BackendError;

// Endpoint paths relative to the backend base URL
pub const USERS_PATH: &str = "api/auth/users/";
pub const REGIONS_PATH: &str = "api/auth/regions/";
pub const DISTRICTS_PATH: &str = "api/auth/districts/";
pub const DEBATES_PATH: &str = "api/core/debates/";
pub const TICKETS_PATH: &str = "api/core/tickets/";

/// Upper bound on `next` links followed for one list
pub const MAX_PAGES: usize = 20;

/// User record sent on first contact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub language_code: Option<String>,
}

/// A single registration field, serialized as a one-key JSON object
/// (`{"name": "..."}`, `{"region": 3}`, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Name(String),
    Phone(String),
    EnglishLevel(String),
    Age(String),
    Region(i64),
    District(i64),
}

impl UserField {
    /// Field name as the backend knows it
    pub fn key(&self) -> &'static str {
        match self {
            UserField::Name(_) => "name",
            UserField::Phone(_) => "phone",
            UserField::EnglishLevel(_) => "english_level",
            UserField::Age(_) => "age",
            UserField::Region(_) => "region",
            UserField::District(_) => "district",
        }
    }
}

/// Paginated list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Anything with a display name
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct District {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub telegram_group_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Debate {
    #[serde(default)]
    pub id: i64,
    pub region: Named,
    pub district: Named,
    #[serde(default)]
    pub is_passed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticket {
    pub qr_code: String,
}

/// Filter for debate listings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebateFilter {
    pub district: Option<i64>,
    pub upcoming_only: bool,
}

/// Operations the bot needs from the backend of record
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create or update the user identified by `user.id`
    async fn upsert_user(&self, user: &NewUser) -> Result<(), BackendError>;

    /// Partially update one field of a user
    async fn update_user(&self, user_id: UserId, field: &UserField) -> Result<(), BackendError>;

    async fn list_debates(&self, filter: DebateFilter) -> Result<Vec<Debate>, BackendError>;

    /// Regions, optionally only those with upcoming debates
    async fn list_regions(&self, upcoming_only: bool) -> Result<Vec<Region>, BackendError>;

    /// Districts of a region, optionally only those with upcoming debates
    async fn list_districts(
        &self,
        region_id: i64,
        upcoming_only: bool,
    ) -> Result<Vec<District>, BackendError>;

    async fn get_district(&self, district_id: i64) -> Result<District, BackendError>;

    async fn create_ticket(&self, debate_id: i64, user_id: UserId) -> Result<Ticket, BackendError>;
}

/// `reqwest` implementation of [`Backend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build a client for `base_url` with a per-request timeout
    pub fn new(base_url: Url, timeout: std::time::Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(format!("{path}: {e}")))
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(BackendError::Status {
                status,
                url: response.url().to_string(),
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let response = self.client.get(url).query(query).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    /// Fetch every page of a list, following `next` links
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let mut page: Page<T> = self.get_json(self.endpoint(path)?, query).await?;
        let mut items = std::mem::take(&mut page.results);
        let mut pages = 1;

        while let Some(next) = page.next.take() {
            if pages >= MAX_PAGES {
                warn!(path = %path, pages, "Stopped following pagination links");
                break;
            }
            let url = Url::parse(&next)
                .map_err(|e| BackendError::InvalidUrl(format!("{next}: {e}")))?;
            // `next` already carries the query string
            page = self.get_json(url, &[]).await?;
            items.append(&mut page.results);
            pages += 1;
        }

        debug!(path = %path, pages, count = items.len(), "Fetched list from backend");
        Ok(items)
    }
}

fn upcoming_query(key: &'static str, upcoming_only: bool) -> Option<(&'static str, String)> {
    upcoming_only.then(|| (key, "false".to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upsert_user(&self, user: &NewUser) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint(USERS_PATH)?)
            .json(user)
            .send()
            .await?;
        Self::check(response)?;
        Ok(())
    }

    async fn update_user(&self, user_id: UserId, field: &UserField) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("{USERS_PATH}{}/", user_id.0))?;
        let response = self.client.patch(url).json(field).send().await?;
        Self::check(response)?;
        Ok(())
    }

    async fn list_debates(&self, filter: DebateFilter) -> Result<Vec<Debate>, BackendError> {
        let mut query = Vec::new();
        if let Some(district) = filter.district {
            query.push(("district", district.to_string()));
        }
        query.extend(upcoming_query("is_passed", filter.upcoming_only));

        self.get_all(DEBATES_PATH, &query).await
    }

    async fn list_regions(&self, upcoming_only: bool) -> Result<Vec<Region>, BackendError> {
        let query: Vec<_> = upcoming_query("debates__is_passed", upcoming_only)
            .into_iter()
            .collect();
        self.get_all(REGIONS_PATH, &query).await
    }

    async fn list_districts(
        &self,
        region_id: i64,
        upcoming_only: bool,
    ) -> Result<Vec<District>, BackendError> {
        let mut query = vec![("region", region_id.to_string())];
        query.extend(upcoming_query("debates__is_passed", upcoming_only));
        self.get_all(DISTRICTS_PATH, &query).await
    }

    async fn get_district(&self, district_id: i64) -> Result<District, BackendError> {
        let url = self.endpoint(&format!("{DISTRICTS_PATH}{district_id}/"))?;
        self.get_json(url, &[]).await
    }

    async fn create_ticket(&self, debate_id: i64, user_id: UserId) -> Result<Ticket, BackendError> {
        let body = serde_json::json!({ "debate": debate_id, "user": user_id.0 });
        let response = self
            .client
            .post(self.endpoint(TICKETS_PATH)?)
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }
}
