//! Shared state for the Telegram bot.
//!
//! Every command's reply is built here as plain text so the handlers only
//! deal with Telegram I/O.

use std::sync::Arc;

use melon_core::{
    format_detail, format_digest, format_file_hit, format_search_results, CatalogApi, CatalogClient,
    Detail, DetailResolver, FileLookup, MelonError, OneBotFileStore, RemoteFileStore, Settings,
    UpdateWindowFetcher,
};
use melon_runtime::{
    DigestPush, Notifier, PushJob, PushScheduler, SchedulerConfig, TriggerState,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;

/// What to send back for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// An image with the text as its caption.
    Photo { url: String, caption: String },
}

impl Reply {
    /// The text part of the reply.
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::Photo { caption, .. } => caption,
        }
    }
}

/// State shared by all handlers.
pub struct BotState {
    settings: Settings,
    catalog: Arc<dyn CatalogApi>,
    resolver: DetailResolver,
    window: UpdateWindowFetcher,
    /// `None` when no push targets are configured.
    push: Option<Arc<DigestPush>>,
    scheduler_config: SchedulerConfig,
    scheduler: Mutex<Option<PushScheduler>>,
}

impl BotState {
    /// Build the catalog and file-store clients described by `settings`.
    pub fn new(settings: Settings, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let catalog: Arc<dyn CatalogApi> =
            Arc::new(CatalogClient::new(settings.base_url.clone(), settings.request_timeout)?);

        let files = match &settings.file_store {
            Some(fs) => {
                let store: Arc<dyn RemoteFileStore> = Arc::new(OneBotFileStore::new(
                    fs.url.clone(),
                    fs.access_token.clone(),
                    settings.request_timeout,
                )?);
                Some((store, fs.group_id))
            }
            None => None,
        };

        Ok(Self::with_parts(settings, catalog, files, notifier, SchedulerConfig::default()))
    }

    /// Assemble state from ready-made clients.
    pub fn with_parts(
        settings: Settings,
        catalog: Arc<dyn CatalogApi>,
        files: Option<(Arc<dyn RemoteFileStore>, i64)>,
        notifier: Arc<dyn Notifier>,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let lookup = files.map(|(store, group_id)| FileLookup::new(store, group_id));
        let resolver = DetailResolver::new(Arc::clone(&catalog), lookup);
        let window = UpdateWindowFetcher::new(Arc::clone(&catalog));

        let push = if settings.push.target_groups.is_empty() {
            None
        } else {
            Some(Arc::new(DigestPush::new(
                window.clone(),
                notifier,
                settings.push.target_groups.clone(),
                settings.push.check_hours,
                scheduler_config.send_pause,
            )))
        };

        Self {
            settings,
            catalog,
            resolver,
            window,
            push,
            scheduler_config,
            scheduler: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reply for `/search <keyword>`.
    pub async fn search(&self, keyword: &str) -> String {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return "Please provide a keyword.\n\nUsage: /search <keyword>".to_string();
        }

        match self.catalog.search(keyword).await {
            Ok(records) => {
                info!(keyword = %keyword, count = records.len(), "Search completed");
                format_search_results(keyword, &records)
            }
            Err(e) => failure_text("Search", &e),
        }
    }

    /// Reply for `/cid <code>`.
    pub async fn detail(&self, code: &str) -> Reply {
        let code = code.trim();
        if code.is_empty() {
            return Reply::Text("Please provide a code.\n\nUsage: /cid <code>".to_string());
        }

        match self.resolver.resolve(code).await {
            Ok(Detail::SharedFile(entry)) => Reply::Text(format_file_hit(&entry)),
            Ok(Detail::Record { record, cover }) => {
                let caption = format_detail(&record);
                match cover {
                    Some(url) => Reply::Photo { url, caption },
                    None => Reply::Text(caption),
                }
            }
            Ok(Detail::NotFound) => Reply::Text(format!("Nothing found for 【{}】.", code)),
            Err(e) => Reply::Text(failure_text("Lookup", &e)),
        }
    }

    /// Reply for `/latest [hours]`.
    pub async fn latest(&self, arg: &str) -> String {
        let hours = match parse_hours(arg, self.settings.push.check_hours) {
            Ok(hours) => hours,
            Err(message) => return message,
        };

        match self.window.fetch(hours).await {
            Ok(window) => format_digest(&window.items, hours),
            Err(e) => failure_text("Fetching updates", &e),
        }
    }

    /// Reply for `/push`: run one fan-out now.
    pub async fn push_now(&self) -> String {
        let Some(job) = &self.push else {
            return "Push has no target groups configured.".to_string();
        };

        match job.run().await {
            Ok(report) => {
                let mut text = format!(
                    "Pushed digest ({} item{}) to {}/{} chats.",
                    report.items,
                    if report.items == 1 { "" } else { "s" },
                    report.delivery.sent,
                    report.delivery.attempted
                );
                for (target, reason) in &report.delivery.failures {
                    text.push_str(&format!("\n❌ {}: {}", target, reason));
                }
                text
            }
            Err(e) => {
                warn!(error = %e, "Manual push failed");
                format!("❌ Push failed: {}", e)
            }
        }
    }

    /// Reply for `/pushstatus`.
    pub async fn push_status(&self) -> String {
        let push = &self.settings.push;
        let times = if push.times.is_empty() {
            "none".to_string()
        } else {
            push.times
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let targets = if push.target_groups.is_empty() {
            "none".to_string()
        } else {
            push.target_groups
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let scheduler = self.scheduler.lock().await;
        let (live, states) = match scheduler.as_ref() {
            Some(s) => (s.live_tasks(), s.states()),
            None => (0, Vec::new()),
        };

        let mut lines = vec![
            "📡 Push status".to_string(),
            format!("Enabled: {}", if push.enabled { "yes" } else { "no" }),
            format!("Times: {}", times),
            format!("Targets: {}", targets),
            format!("Window: {} hours", push.check_hours),
            format!("Live tasks: {}", live),
        ];
        for (at, state) in states {
            lines.push(format!("  {} → {}", at.format("%H:%M"), describe_state(state)));
        }
        lines.join("\n")
    }

    /// Start the push scheduler if push is enabled and fully configured.
    ///
    /// Returns whether a scheduler is running afterwards.
    pub async fn start_push(&self) -> Result<bool> {
        if !self.settings.push.is_active() {
            info!(enabled = self.settings.push.enabled, "Scheduled push inactive");
            return Ok(false);
        }
        let Some(job) = &self.push else {
            return Ok(false);
        };

        let mut guard = self.scheduler.lock().await;
        if guard.is_some() {
            return Ok(true);
        }

        let job: Arc<dyn PushJob> = job.clone();
        let mut scheduler = PushScheduler::new(
            self.settings.push.times.clone(),
            job,
            self.scheduler_config.clone(),
        );
        scheduler.start()?;
        *guard = Some(scheduler);
        Ok(true)
    }

    /// Stop the push scheduler, waiting for its tasks to finish.
    pub async fn stop_push(&self) -> Result<()> {
        let scheduler = self.scheduler.lock().await.take();
        if let Some(mut scheduler) = scheduler {
            scheduler.shutdown().await?;
        }
        Ok(())
    }
}

/// Parse the optional hours argument of `/latest`.
pub fn parse_hours(arg: &str, default: u32) -> std::result::Result<u32, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Ok(default);
    }
    match arg.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!(
            "Invalid hours: {}\n\nUsage: /latest [hours], with hours at least 1.",
            arg
        )),
        Ok(hours) => Ok(hours),
    }
}

fn failure_text(action: &str, e: &MelonError) -> String {
    if e.is_transport() {
        format!("⚠️ {} failed, the catalog is unreachable: {}", action, e)
    } else {
        format!("❌ {} failed: {}", action, e)
    }
}

fn describe_state(state: TriggerState) -> String {
    match state {
        TriggerState::Idle => "idle".to_string(),
        TriggerState::Sleeping(until) => format!("next at {}", until.format("%m-%d %H:%M")),
        TriggerState::Firing => "sending".to_string(),
        TriggerState::CoolingDown => "cooling down".to_string(),
        TriggerState::BackingOff => "retrying after error".to_string(),
        TriggerState::Cancelled => "stopped".to_string(),
    }
}
