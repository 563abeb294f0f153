//! In-memory fakes shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use melon_models::{CatalogRecord, OssObject};

use crate::client::CatalogApi;
use crate::error::{MelonError, Result};

/// Catalog fake returning canned records and recording window bounds.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub records: Vec<CatalogRecord>,
    pub detail: Option<CatalogRecord>,
    pub objects: Vec<OssObject>,
    pub fail: bool,
    pub windows: Mutex<Vec<(NaiveDateTime, NaiveDateTime)>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_records(records: Vec<CatalogRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(MelonError::Status {
                status: 503,
                endpoint: "/fake".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<CatalogRecord>> {
        self.check()?;
        Ok(self.records.clone())
    }

    async fn updated_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<CatalogRecord>> {
        self.windows.lock().unwrap().push((start, end));
        self.check()?;
        Ok(self.records.clone())
    }

    async fn query(&self, code: &str) -> Result<Option<CatalogRecord>> {
        self.queries.lock().unwrap().push(code.to_string());
        self.check()?;
        Ok(self.detail.clone())
    }

    async fn oss_objects(&self, _ids: &str) -> Result<Vec<OssObject>> {
        self.check()?;
        Ok(self.objects.clone())
    }
}
