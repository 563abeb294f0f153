//! Fan-out delivery of one message to many destinations.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;

/// Delivers plain text to a destination chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, target: i64, text: &str) -> Result<()>;
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub attempted: usize,
    pub sent: usize,
    /// Destinations that failed, with the reason.
    pub failures: Vec<(i64, String)>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Send `text` to every target in order, pausing `pause` between sends.
///
/// A failed destination is logged and recorded; the remaining destinations
/// are still attempted.
pub async fn fan_out(notifier: &dyn Notifier, targets: &[i64], text: &str, pause: Duration) -> FanOutReport {
    let mut report = FanOutReport::default();

    for (index, &target) in targets.iter().enumerate() {
        if index > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        report.attempted += 1;
        match notifier.send_text(target, text).await {
            Ok(()) => {
                report.sent += 1;
                info!(target, "Push delivered");
            }
            Err(e) => {
                warn!(target, error = %e, "Push delivery failed");
                report.failures.push((target, e.to_string()));
            }
        }
    }

    report
}
