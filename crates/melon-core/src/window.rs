//! Trailing update windows.
//!
//! A window always ends at the moment it is fetched and extends back the
//! requested number of hours.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use melon_models::CatalogRecord;
use tracing::info;

use crate::client::CatalogApi;
use crate::error::{MelonError, Result};

/// Records updated within `[start, end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Width used to compute `start`.
    pub hours: u32,
    /// Records in backend order.
    pub items: Vec<CatalogRecord>,
}

impl UpdateWindow {
    /// Bounds of a window of `hours` ending at `end`.
    pub fn bounds(end: NaiveDateTime, hours: u32) -> Result<(NaiveDateTime, NaiveDateTime)> {
        if hours == 0 {
            return Err(MelonError::Config("update window must be at least 1 hour".to_string()));
        }
        let start = Duration::try_hours(i64::from(hours))
            .and_then(|width| end.checked_sub_signed(width))
            .ok_or_else(|| MelonError::Config(format!("update window too wide: {} hours", hours)))?;
        Ok((start, end))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Queries the catalog for recently updated records.
#[derive(Clone)]
pub struct UpdateWindowFetcher {
    api: Arc<dyn CatalogApi>,
}

impl UpdateWindowFetcher {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Fetch the window of `hours` ending now (local time).
    ///
    /// Failures are returned as errors and never collapse into an empty
    /// window, so callers can tell "nothing new" from "could not ask".
    pub async fn fetch(&self, hours: u32) -> Result<UpdateWindow> {
        self.fetch_until(Local::now().naive_local(), hours).await
    }

    /// Fetch the window of `hours` ending at `end`.
    pub async fn fetch_until(&self, end: NaiveDateTime, hours: u32) -> Result<UpdateWindow> {
        let (start, end) = UpdateWindow::bounds(end, hours)?;
        let items = self.api.updated_between(start, end).await?;

        info!(
            start = %start,
            end = %end,
            count = items.len(),
            "Fetched update window"
        );

        Ok(UpdateWindow {
            start,
            end,
            hours,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_bounds_follow_hours() {
        let (start, end) = UpdateWindow::bounds(at(20, 0), 6).unwrap();
        assert_eq!(start, at(14, 0));
        assert_eq!(end, at(20, 0));
        assert!(start < end);
    }

    #[test]
    fn test_bounds_cross_midnight() {
        let (start, _) = UpdateWindow::bounds(at(2, 30), 12).unwrap();
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2024, 5, 11).unwrap().and_hms_opt(14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_zero_hours_rejected() {
        assert!(matches!(UpdateWindow::bounds(at(8, 0), 0), Err(MelonError::Config(_))));
    }

    #[test]
    fn test_oversized_window_rejected() {
        assert!(matches!(
            UpdateWindow::bounds(at(8, 0), u32::MAX),
            Err(MelonError::Config(_))
        ));
        // A century back is still representable.
        assert!(UpdateWindow::bounds(at(8, 0), 24 * 365 * 100).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_oversized_window_is_error() {
        let api = Arc::new(FakeCatalog::default());
        let fetcher = UpdateWindowFetcher::new(api.clone());

        let result = fetcher.fetch(3_000_000_000).await;

        assert!(matches!(result, Err(MelonError::Config(_))));
        assert!(api.windows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_passes_requested_width() {
        let api = Arc::new(FakeCatalog::with_records(vec![CatalogRecord::new("1")]));
        let fetcher = UpdateWindowFetcher::new(api.clone());

        let window = fetcher.fetch_until(at(12, 0), 3).await.unwrap();

        assert_eq!(window.items.len(), 1);
        assert_eq!(window.hours, 3);
        assert_eq!(*api.windows.lock().unwrap(), vec![(at(9, 0), at(12, 0))]);
    }

    #[tokio::test]
    async fn test_fetch_empty_is_ok() {
        let fetcher = UpdateWindowFetcher::new(Arc::new(FakeCatalog::default()));
        let window = fetcher.fetch(12).await.unwrap();
        assert!(window.is_empty());
        assert!(window.start < window.end);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_error() {
        let fetcher = UpdateWindowFetcher::new(Arc::new(FakeCatalog::failing()));
        assert!(fetcher.fetch(12).await.is_err());
    }
}
