//! Scheduled digest pushes for Melon.
//!
//! - `PushScheduler` - one task per configured time of day
//! - `DigestPush` - fetch the update window, render, fan out
//! - `Notifier` / `fan_out` - sequential delivery with per-target isolation
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use melon_core::{CatalogClient, Settings, UpdateWindowFetcher};
//! use melon_runtime::{DigestPush, PushScheduler, SchedulerConfig};
//!
//! let settings = Settings::from_env()?;
//! let api = Arc::new(CatalogClient::new(&settings.base_url, settings.request_timeout)?);
//! let config = SchedulerConfig::default();
//! let job = DigestPush::new(
//!     UpdateWindowFetcher::new(api),
//!     notifier,
//!     settings.push.target_groups.clone(),
//!     settings.push.check_hours,
//!     config.send_pause,
//! );
//!
//! let mut scheduler = PushScheduler::new(settings.push.times.clone(), Arc::new(job), config);
//! scheduler.start()?;
//! // ...
//! scheduler.shutdown().await?;
//! ```

pub mod config;
pub mod error;
pub mod notify;
pub mod push;
pub mod schedule;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use error::{Result, SchedulerError};
pub use notify::{fan_out, FanOutReport, Notifier};
pub use push::{DigestPush, PushJob, PushReport};
pub use schedule::{next_fire, sleep_duration, Clock, LocalClock};
pub use scheduler::{PushScheduler, TriggerState};
