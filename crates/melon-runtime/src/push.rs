//! The work done when a push trigger fires.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use melon_core::{format_digest, UpdateWindowFetcher};
use tracing::info;

use crate::error::Result;
use crate::notify::{fan_out, FanOutReport, Notifier};

/// Summary of one push cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Records in the digest window.
    pub items: usize,
    pub delivery: FanOutReport,
}

/// One unit of scheduled work.
#[async_trait]
pub trait PushJob: Send + Sync {
    async fn run(&self) -> Result<PushReport>;
}

/// Fetches the trailing update window, renders the digest and fans it out.
pub struct DigestPush {
    fetcher: UpdateWindowFetcher,
    notifier: Arc<dyn Notifier>,
    targets: Vec<i64>,
    window_hours: u32,
    send_pause: Duration,
}

impl DigestPush {
    pub fn new(
        fetcher: UpdateWindowFetcher,
        notifier: Arc<dyn Notifier>,
        targets: Vec<i64>,
        window_hours: u32,
        send_pause: Duration,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            targets,
            window_hours,
            send_pause,
        }
    }

    pub fn targets(&self) -> &[i64] {
        &self.targets
    }

    pub fn window_hours(&self) -> u32 {
        self.window_hours
    }
}

#[async_trait]
impl PushJob for DigestPush {
    async fn run(&self) -> Result<PushReport> {
        // A failed fetch aborts the cycle before anything is sent.
        let window = self.fetcher.fetch(self.window_hours).await?;
        let text = format_digest(&window.items, self.window_hours);

        let delivery = fan_out(self.notifier.as_ref(), &self.targets, &text, self.send_pause).await;
        info!(
            items = window.items.len(),
            sent = delivery.sent,
            failed = delivery.failures.len(),
            "Digest push finished"
        );

        Ok(PushReport {
            items: window.items.len(),
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use melon_core::{CatalogApi, MelonError};
    use melon_models::{CatalogRecord, OssObject};
    use std::sync::Mutex;

    struct WindowCatalog {
        records: Option<Vec<CatalogRecord>>,
    }

    #[async_trait]
    impl CatalogApi for WindowCatalog {
        async fn search(&self, _keyword: &str) -> melon_core::Result<Vec<CatalogRecord>> {
            Ok(Vec::new())
        }

        async fn updated_between(
            &self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> melon_core::Result<Vec<CatalogRecord>> {
            self.records
                .clone()
                .ok_or_else(|| MelonError::Http("connection refused".to_string()))
        }

        async fn query(&self, _code: &str) -> melon_core::Result<Option<CatalogRecord>> {
            Ok(None)
        }

        async fn oss_objects(&self, _ids: &str) -> melon_core::Result<Vec<OssObject>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_text(&self, target: i64, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push((target, text.to_string()));
            Ok(())
        }
    }

    fn job(records: Option<Vec<CatalogRecord>>, notifier: Arc<RecordingNotifier>) -> DigestPush {
        let fetcher = UpdateWindowFetcher::new(Arc::new(WindowCatalog { records }));
        DigestPush::new(fetcher, notifier, vec![10, 20], 6, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_digest_sent_to_every_target() {
        let notifier = Arc::new(RecordingNotifier::default());
        let records = vec![CatalogRecord::new("1").with_code("A1").with_title("T")];
        let push = job(Some(records.clone()), notifier.clone());

        let report = push.run().await.unwrap();

        assert_eq!(report.items, 1);
        assert_eq!(report.delivery.sent, 2);

        let expected = format_digest(&records, 6);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(*sent, vec![(10, expected.clone()), (20, expected)]);
    }

    #[tokio::test]
    async fn test_empty_window_still_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let push = job(Some(Vec::new()), notifier.clone());

        let report = push.run().await.unwrap();

        assert_eq!(report.items, 0);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, "No new items in the last 6 hours.");
    }

    #[tokio::test]
    async fn test_fetch_failure_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let push = job(None, notifier.clone());

        assert!(push.run().await.is_err());
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(push.targets(), &[10, 20]);
        assert_eq!(push.window_hours(), 6);
    }
}
