use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::pagination::PageQuery;
use crate::utils::find_char_boundary;

// ── Wire types ──────────────────────────────────────────────────────────

/// Aggregate counters served by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatsSnapshot {
    pub total_users: u64,
    pub active_users_today: u64,
    pub total_messages: u64,
    pub funny_messages: u64,
}

/// One inbound message and the bot's reply, as served by `GET /api/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub content: String,
    /// The backend column is nullable; a missing reply becomes an empty string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
    pub is_funny: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    pub user_full_name: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse an ISO-8601 timestamp. Strings without an offset are taken as UTC,
/// which is what the backend emits.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .with_context(|| format!("Invalid timestamp '{}'", raw))?;
    Ok(Utc.from_utc_datetime(&naive))
}

// ── Client seam ─────────────────────────────────────────────────────────

/// Read-only access to the bot backend.
///
/// Every failure (transport, non-2xx status, undecodable body) is the same
/// kind of error to callers: the fetch failed.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn fetch_stats(&self) -> Result<StatsSnapshot>;

    /// Fetch at most `query.limit` records starting at `query.offset`.
    async fn fetch_messages(&self, query: PageQuery) -> Result<Vec<MessageRecord>>;
}

/// `AdminApi` over HTTP with reqwest.
pub struct HttpAdminApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAdminApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!(
                "api_base_url must start with http:// or https:// (got '{}')",
                base_url
            ));
        }
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats_url(&self) -> String {
        format!("{}/api/stats", self.base_url)
    }

    pub fn messages_url(&self, query: PageQuery) -> String {
        format!(
            "{}/api/messages?limit={}&offset={}",
            self.base_url, query.limit, query.offset
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("HTTP error requesting {}", url))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        if !status.is_success() {
            bail!(
                "{} returned {}: {}",
                url,
                status,
                &body[..find_char_boundary(&body, 200)]
            );
        }

        serde_json::from_str(&body).with_context(|| {
            format!(
                "Failed to parse JSON from {}. Raw body:\n{}",
                url,
                &body[..find_char_boundary(&body, 500)]
            )
        })
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        self.get_json(&self.stats_url()).await
    }

    async fn fetch_messages(&self, query: PageQuery) -> Result<Vec<MessageRecord>> {
        self.get_json(&self.messages_url(query)).await
    }
}
