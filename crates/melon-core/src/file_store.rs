//! Shared-file storage access.
//!
//! [`RemoteFileStore`] lists one folder of a group's shared files at a time.
//! [`OneBotFileStore`] implements it over a OneBot-compatible HTTP gateway.

use std::time::Duration;

use async_trait::async_trait;
use melon_models::FolderListing;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{classify, MelonError, Result};

/// Maximum entries requested per folder listing.
pub const PAGE_SIZE: u32 = 2000;

/// Folder id some gateways use for the root folder.
pub const ROOT_FOLDER_ID: &str = "/";

/// Lists folders of a group's shared-file storage.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// List the files and folders at the root.
    async fn list_root(&self, group_id: i64) -> Result<FolderListing>;

    /// List the files and folders inside `folder_id`.
    async fn list_folder(&self, group_id: i64, folder_id: &str) -> Result<FolderListing>;
}

/// Response envelope used by OneBot gateways.
#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    retcode: i64,
    #[serde(default)]
    data: Option<FolderListing>,
    #[serde(default)]
    wording: Option<String>,
}

/// Shared-file store reached through a OneBot HTTP gateway.
#[derive(Debug, Clone)]
pub struct OneBotFileStore {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl OneBotFileStore {
    /// Create a store talking to the gateway at `base_url`.
    pub fn new(base_url: impl Into<String>, access_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MelonError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            timeout,
        })
    }

    async fn call_action(&self, action: &str, params: serde_json::Value) -> Result<FolderListing> {
        let url = format!("{}/{}", self.base_url, action);
        debug!(action = %action, "file store request");

        let mut request = self.client.post(&url).json(&params);
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| classify(e, self.timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MelonError::Status {
                status: status.as_u16(),
                endpoint: action.to_string(),
            });
        }

        let body: ActionResponse = response
            .json()
            .await
            .map_err(|e| MelonError::FileStore(format!("{action}: undecodable response: {e}")))?;

        interpret(action, body)
    }
}

fn interpret(action: &str, body: ActionResponse) -> Result<FolderListing> {
    if body.retcode != 0 || body.status == "failed" {
        return Err(MelonError::FileStore(format!(
            "{action} failed (retcode {}): {}",
            body.retcode,
            body.wording.unwrap_or_default()
        )));
    }
    // A successful call with no data is an empty folder.
    Ok(body.data.unwrap_or_default())
}

#[async_trait]
impl RemoteFileStore for OneBotFileStore {
    async fn list_root(&self, group_id: i64) -> Result<FolderListing> {
        self.call_action(
            "get_group_root_files",
            json!({ "group_id": group_id, "file_count": PAGE_SIZE }),
        )
        .await
    }

    async fn list_folder(&self, group_id: i64, folder_id: &str) -> Result<FolderListing> {
        self.call_action(
            "get_group_files_by_folder",
            json!({ "group_id": group_id, "folder_id": folder_id, "file_count": PAGE_SIZE }),
        )
        .await
    }
}
