//! Daily push triggers.
//!
//! Each configured time of day gets its own task. A task sleeps until the
//! next occurrence of its time, runs the push job, cools down, and sleeps
//! again. Failed cycles back off and retry; only shutdown ends a task.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::push::{PushJob, PushReport};
use crate::schedule::{next_fire, sleep_duration, Clock, LocalClock};

/// Where a trigger task is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Spawned, not yet armed.
    Idle,
    /// Waiting for the given local time.
    Sleeping(NaiveDateTime),
    /// Running the push job.
    Firing,
    /// Pausing after a successful fire.
    CoolingDown,
    /// Pausing after a failed cycle.
    BackingOff,
    /// Stopped by shutdown.
    Cancelled,
}

/// A running trigger and its observable state.
struct Trigger {
    at: NaiveTime,
    handle: JoinHandle<()>,
    state: watch::Receiver<TriggerState>,
}

/// Owns one task per distinct push time.
pub struct PushScheduler {
    times: Vec<NaiveTime>,
    job: Arc<dyn PushJob>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    triggers: Vec<Trigger>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver (cloned into each trigger).
    shutdown_rx: watch::Receiver<bool>,
    started: bool,
}

impl PushScheduler {
    /// Create a scheduler using the local system clock.
    ///
    /// Duplicate times are collapsed; each distinct time gets one task.
    pub fn new(times: Vec<NaiveTime>, job: Arc<dyn PushJob>, config: SchedulerConfig) -> Self {
        Self::with_clock(times, job, config, Arc::new(LocalClock))
    }

    /// Create a scheduler with a custom clock.
    pub fn with_clock(
        mut times: Vec<NaiveTime>,
        job: Arc<dyn PushJob>,
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        times.sort();
        times.dedup();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            times,
            job,
            clock,
            config,
            triggers: Vec::new(),
            shutdown_tx,
            shutdown_rx,
            started: false,
        }
    }

    /// Spawn one trigger task per distinct time.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(SchedulerError::AlreadyStarted);
        }

        info!(times = ?self.times, "starting push scheduler");

        let triggers = self
            .times
            .iter()
            .map(|&at| {
                let (state_tx, state_rx) = watch::channel(TriggerState::Idle);
                let task = TriggerTask {
                    at,
                    job: Arc::clone(&self.job),
                    clock: Arc::clone(&self.clock),
                    config: self.config.clone(),
                    shutdown: self.shutdown_rx.clone(),
                    state: state_tx,
                };
                Trigger {
                    at,
                    handle: tokio::spawn(task.run()),
                    state: state_rx,
                }
            })
            .collect();

        self.triggers = triggers;
        self.started = true;
        Ok(())
    }

    /// Signal every trigger and wait for all of them to stop.
    ///
    /// A fire already in progress completes its fan-out first.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Err(SchedulerError::NotStarted);
        }

        info!(tasks = self.triggers.len(), "shutting down push scheduler");

        self.shutdown_tx.send(true).map_err(|e| {
            SchedulerError::Shutdown(format!("failed to send shutdown signal: {}", e))
        })?;

        // Finished triggers are kept so their final state stays observable.
        let mut panicked = Vec::new();
        for trigger in &mut self.triggers {
            debug!(time = %trigger.at, "waiting for push trigger to stop");
            if let Err(e) = (&mut trigger.handle).await {
                panicked.push(format!("{}: {}", trigger.at, e));
            }
        }

        self.started = false;

        if !panicked.is_empty() {
            return Err(SchedulerError::Shutdown(format!(
                "trigger task failed: {}",
                panicked.join(", ")
            )));
        }

        info!("push scheduler stopped");
        Ok(())
    }

    /// Run the push job once, outside the schedule.
    pub async fn trigger_now(&self) -> Result<PushReport> {
        self.job.run().await
    }

    /// Number of trigger tasks still running.
    pub fn live_tasks(&self) -> usize {
        self.triggers.iter().filter(|t| !t.handle.is_finished()).count()
    }

    /// Current state of every trigger, ordered by time.
    pub fn states(&self) -> Vec<(NaiveTime, TriggerState)> {
        self.triggers.iter().map(|t| (t.at, *t.state.borrow())).collect()
    }

    /// Distinct configured times, sorted.
    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// Check if the scheduler has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for PushScheduler {
    fn drop(&mut self) {
        // Send shutdown signal if still running
        if self.started {
            let _ = self.shutdown_tx.send(true);
        }
    }
}

/// State owned by one trigger task.
struct TriggerTask {
    at: NaiveTime,
    job: Arc<dyn PushJob>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    shutdown: watch::Receiver<bool>,
    state: watch::Sender<TriggerState>,
}

impl TriggerTask {
    async fn run(mut self) {
        debug!(time = %self.at, "push trigger started");

        loop {
            let now = self.clock.now();
            let until = next_fire(now, self.at);
            let wait = sleep_duration(now, self.at);
            self.set_state(TriggerState::Sleeping(until));
            debug!(time = %self.at, until = %until, wait_secs = wait.as_secs(), "sleeping until next push");

            if !self.pause(wait).await {
                break;
            }

            self.set_state(TriggerState::Firing);
            info!(time = %self.at, "push trigger firing");

            let outcome = AssertUnwindSafe(self.job.run()).catch_unwind().await;
            let outcome = outcome.unwrap_or_else(|panic| Err(SchedulerError::Panicked(panic_message(&panic))));

            let resume = match outcome {
                Ok(report) => {
                    info!(
                        time = %self.at,
                        items = report.items,
                        sent = report.delivery.sent,
                        failed = report.delivery.failures.len(),
                        "push cycle complete"
                    );
                    self.set_state(TriggerState::CoolingDown);
                    self.pause(self.config.cooldown).await
                }
                Err(e) => {
                    error!(
                        time = %self.at,
                        error = %e,
                        backoff_secs = self.config.error_backoff.as_secs(),
                        "push cycle failed, backing off"
                    );
                    self.set_state(TriggerState::BackingOff);
                    self.pause(self.config.error_backoff).await
                }
            };

            if !resume {
                break;
            }
        }

        self.set_state(TriggerState::Cancelled);
        debug!(time = %self.at, "push trigger stopped");
    }

    /// Sleep for `duration` unless shutdown is signalled first.
    ///
    /// Returns `false` when the task should stop.
    async fn pause(&mut self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if *self.shutdown.borrow_and_update() {
                return false;
            }
            tokio::select! {
                _ = sleep_until(deadline) => return true,
                changed = self.shutdown.changed() => {
                    // The scheduler is gone; nothing can stop us later.
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }

    fn set_state(&self, state: TriggerState) {
        self.state.send_replace(state);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
