//! Catalog backend client.
//!
//! [`CatalogApi`] is the seam the rest of the workspace talks to; the
//! reqwest-backed [`CatalogClient`] implements it against the media
//! backend's web endpoints. Every request carries the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use melon_models::{CatalogRecord, OssListing, OssObject};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{classify, MelonError, Result};

/// Format the backend expects for window bounds (local wall clock).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LIST_PATH: &str = "/media/mediaData/web/list";
const QUERY_PATH: &str = "/media/mediaData/web/query";
const OSS_PATH: &str = "/resource/oss/web/listByIds";

/// Only enabled records are ever requested.
const STATUS_ENABLED: &str = "enable";

/// Operations offered by the media catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Keyword search across enabled records.
    async fn search(&self, keyword: &str) -> Result<Vec<CatalogRecord>>;

    /// Enabled records updated within `[start, end]`.
    async fn updated_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<CatalogRecord>>;

    /// Detail lookup by public code. `Ok(None)` when nothing matched.
    async fn query(&self, code: &str) -> Result<Option<CatalogRecord>>;

    /// Resolve stored-object ids (comma-separated) to URLs.
    async fn oss_objects(&self, ids: &str) -> Result<Vec<OssObject>>;
}

/// HTTP client for the catalog backend.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CatalogClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MelonError::Http(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        // Fail early on a base that cannot be joined.
        Url::parse(&base_url)?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    async fn get_json(&self, url: Url, query: &[(&str, &str)]) -> Result<Value> {
        let endpoint = url.path().to_string();
        debug!(endpoint = %endpoint, ?query, "catalog request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MelonError::Status {
                status: status.as_u16(),
                endpoint,
            });
        }

        let body = response.text().await.map_err(|e| classify(e, self.timeout))?;
        Ok(parse_body(&endpoint, &body))
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn search(&self, keyword: &str) -> Result<Vec<CatalogRecord>> {
        let url = self.endpoint(LIST_PATH)?;
        let body = self
            .get_json(url, &[("contentText", keyword), ("status", STATUS_ENABLED)])
            .await?;
        Ok(decode_records(body))
    }

    async fn updated_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<CatalogRecord>> {
        let start = start.format(TIMESTAMP_FORMAT).to_string();
        let end = end.format(TIMESTAMP_FORMAT).to_string();
        let url = self.endpoint(LIST_PATH)?;
        let body = self
            .get_json(
                url,
                &[
                    ("updateTimeStart", start.as_str()),
                    ("updateTimeEnd", end.as_str()),
                    ("status", STATUS_ENABLED),
                ],
            )
            .await?;
        Ok(decode_records(body))
    }

    async fn query(&self, code: &str) -> Result<Option<CatalogRecord>> {
        let url = self.endpoint(QUERY_PATH)?;
        let body = self.get_json(url, &[("code", code)]).await?;
        Ok(decode_single(body))
    }

    async fn oss_objects(&self, ids: &str) -> Result<Vec<OssObject>> {
        let mut url = self.endpoint(OSS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| MelonError::Config(format!("base URL cannot carry a path: {}", self.base_url)))?
            .push(ids);

        let body = self.get_json(url, &[]).await?;
        let listing: OssListing = match serde_json::from_value(body) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(ids = %ids, error = %e, "Malformed stored-object listing");
                return Ok(Vec::new());
            }
        };

        if !listing.is_ok() {
            warn!(ids = %ids, code = listing.code, "Stored-object lookup reported failure");
            return Ok(Vec::new());
        }
        Ok(listing.data)
    }
}

/// Malformed bodies are logged and treated as empty.
fn parse_body(endpoint: &str, body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        warn!(endpoint = %endpoint, error = %e, "Backend returned a non-JSON body");
        Value::Null
    })
}

/// Extract a record list from a payload.
///
/// Accepts a bare array or an object wrapping it under `rows` or `data`.
/// Elements that do not decode are skipped.
pub fn decode_records(body: Value) -> Vec<CatalogRecord> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("rows").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<CatalogRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable catalog record");
                None
            }
        })
        .collect()
}

/// Extract one record from a detail payload: a record object, a list whose
/// first element is the record, or either of those under `data`.
pub fn decode_single(body: Value) -> Option<CatalogRecord> {
    match body {
        Value::Array(items) => items.into_iter().next().and_then(decode_single),
        Value::Object(mut map) => {
            if map.contains_key("data") && !map.contains_key("id") {
                return map.remove("data").and_then(decode_single);
            }
            let record: CatalogRecord = serde_json::from_value(Value::Object(map)).ok()?;
            // Status envelopes such as `{"code":200,"msg":"..."}` have no id or title.
            let has_title = record.title.as_deref().is_some_and(|t| !t.is_empty());
            (!record.id.is_empty() || has_title).then_some(record)
        }
        _ => None,
    }
}
