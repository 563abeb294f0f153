//! Timing tests for push triggers, run on tokio's paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use melon_core::{CatalogApi, UpdateWindowFetcher};
use melon_models::{CatalogRecord, OssObject};
use melon_runtime::{
    Clock, DigestPush, Notifier, PushJob, PushReport, PushScheduler, Result, SchedulerConfig, SchedulerError,
    TriggerState,
};
use tokio::time::{sleep, timeout, Instant};

/// A wall clock frozen at one instant.
struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

struct CountingJob {
    runs: AtomicUsize,
    behaviour: Behaviour,
}

impl CountingJob {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            runs: AtomicUsize::new(0),
            behaviour,
        })
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushJob for CountingJob {
    async fn run(&self) -> Result<PushReport> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => Ok(PushReport::default()),
            Behaviour::Fail => Err(SchedulerError::Send {
                target: 1,
                reason: "backend down".to_string(),
            }),
            Behaviour::Panic => panic!("formatter exploded"),
        }
    }
}

fn eight() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}

fn clock_at(h: u32, m: u32, s: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock(
        NaiveDate::from_ymd_opt(2024, 5, 12)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap(),
    ))
}

fn scheduler(job: Arc<CountingJob>, clock: Arc<FixedClock>) -> PushScheduler {
    PushScheduler::with_clock(vec![eight()], job, SchedulerConfig::default(), clock)
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_sleeping_does_not_fire() {
    let job = CountingJob::new(Behaviour::Succeed);
    let mut scheduler = scheduler(job.clone(), clock_at(7, 0, 0));
    scheduler.start().unwrap();

    sleep(Duration::from_secs(10)).await;
    let states = scheduler.states();
    assert!(matches!(states[0].1, TriggerState::Sleeping(_)));

    timeout(Duration::from_secs(1), scheduler.shutdown())
        .await
        .expect("trigger should stop promptly")
        .unwrap();

    assert_eq!(job.runs(), 0);
    assert_eq!(scheduler.live_tasks(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fires_then_cools_down() {
    let job = CountingJob::new(Behaviour::Succeed);
    let mut scheduler = scheduler(job.clone(), clock_at(7, 59, 59));
    scheduler.start().unwrap();

    sleep(Duration::from_secs(2)).await;
    assert_eq!(job.runs(), 1);
    assert_eq!(scheduler.states()[0].1, TriggerState::CoolingDown);

    // The frozen clock would re-arm for one second later; the cooldown
    // keeps the trigger from firing again meanwhile.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(job.runs(), 1);

    scheduler.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_backs_off_and_retries() {
    let job = CountingJob::new(Behaviour::Fail);
    let mut scheduler = scheduler(job.clone(), clock_at(7, 59, 59));
    scheduler.start().unwrap();

    sleep(Duration::from_secs(2)).await;
    assert_eq!(job.runs(), 1);
    assert_eq!(scheduler.states()[0].1, TriggerState::BackingOff);

    sleep(Duration::from_secs(200)).await;
    assert_eq!(job.runs(), 1);

    sleep(Duration::from_secs(110)).await;
    assert_eq!(job.runs(), 2);
    assert_eq!(scheduler.live_tasks(), 1);

    scheduler.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_panicking_job_does_not_kill_trigger() {
    let job = CountingJob::new(Behaviour::Panic);
    let mut scheduler = scheduler(job.clone(), clock_at(7, 59, 59));
    scheduler.start().unwrap();

    sleep(Duration::from_secs(2)).await;
    assert_eq!(job.runs(), 1);
    assert_eq!(scheduler.live_tasks(), 1);
    assert_eq!(scheduler.states()[0].1, TriggerState::BackingOff);

    scheduler.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let job = CountingJob::new(Behaviour::Fail);
    let mut scheduler = scheduler(job.clone(), clock_at(7, 59, 59));
    scheduler.start().unwrap();

    sleep(Duration::from_secs(2)).await;

    timeout(Duration::from_secs(1), scheduler.shutdown())
        .await
        .expect("trigger should stop promptly")
        .unwrap();
    assert_eq!(job.runs(), 1);
}

/// A catalog with nothing new, so every digest is the one-line message.
struct QuietCatalog;

#[async_trait]
impl CatalogApi for QuietCatalog {
    async fn search(&self, _keyword: &str) -> melon_core::Result<Vec<CatalogRecord>> {
        Ok(Vec::new())
    }

    async fn updated_between(
        &self,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> melon_core::Result<Vec<CatalogRecord>> {
        Ok(Vec::new())
    }

    async fn query(&self, _code: &str) -> melon_core::Result<Option<CatalogRecord>> {
        Ok(None)
    }

    async fn oss_objects(&self, _ids: &str) -> melon_core::Result<Vec<OssObject>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingChats {
    sent: Mutex<Vec<(i64, Instant)>>,
}

#[async_trait]
impl Notifier for RecordingChats {
    async fn send_text(&self, target: i64, _text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((target, Instant::now()));
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_fan_out_in_progress() {
    let chats = Arc::new(RecordingChats::default());
    let job = DigestPush::new(
        UpdateWindowFetcher::new(Arc::new(QuietCatalog)),
        chats.clone(),
        vec![10, 20, 30],
        12,
        Duration::from_secs(1),
    );
    let mut scheduler = PushScheduler::with_clock(
        vec![eight()],
        Arc::new(job),
        SchedulerConfig::default(),
        clock_at(7, 59, 59),
    );
    scheduler.start().unwrap();

    // First send at 1s, the other two follow at 2s and 3s.
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(scheduler.states()[0].1, TriggerState::Firing);
    assert_eq!(chats.sent.lock().unwrap().len(), 1);

    let requested = Instant::now();
    timeout(Duration::from_secs(10), scheduler.shutdown())
        .await
        .expect("trigger should stop after its fan-out")
        .unwrap();

    let sent = chats.sent.lock().unwrap().clone();
    let targets: Vec<i64> = sent.iter().map(|(t, _)| *t).collect();
    assert_eq!(targets, vec![10, 20, 30]);
    assert!(sent[2].1 > requested);
    assert_eq!(scheduler.states()[0].1, TriggerState::Cancelled);
    assert_eq!(scheduler.live_tasks(), 0);
}
