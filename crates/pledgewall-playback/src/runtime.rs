// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display runtime: one scheduler, one goal tracker and one projection
//! driven by a single cooperative loop.
//!
//! The loop waits on store change events from the bus, the scheduler's
//! reveal deadline, a housekeeping tick for projection expiry, and a
//! cancellation token. After each wake-up it publishes a fresh
//! [`DisplaySnapshot`] on a watch channel if anything visible changed.

use std::sync::Arc;
use std::time::Duration;

use pledgewall_bus::events::StoreEvent;
use pledgewall_config::{Cadence, PledgewallConfig};
use pledgewall_core::{
    DisplayMode, DisplayStore, DonationQueue, LogoConfig, PlaybackRole, QueueStatus, ThemeConfig,
};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::goal::{GoalProgress, GoalTracker};
use crate::projection::{Projection, ProjectionSettings, ProjectionView};
use crate::scheduler::{PlaybackEvent, PlaybackScheduler, PlaybackStatus};

/// Everything a display runtime needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub mode: DisplayMode,
    pub role: PlaybackRole,
    pub cadence: Cadence,
    pub projection: ProjectionSettings,
    pub poll_interval: Duration,
    pub housekeeping_interval: Duration,
    /// How long a status message stays on the snapshot.
    pub status_message_ttl: Duration,
}

impl RuntimeSettings {
    pub fn from_config(config: &PledgewallConfig, mode: DisplayMode) -> Self {
        Self {
            mode,
            role: config.display.role,
            cadence: config.cadence(mode),
            projection: ProjectionSettings {
                max_visible: config.ticker.max_visible,
                lifetime: Duration::from_millis(config.ticker.lifetime_ms),
                highlight: Duration::from_millis(config.ticker.highlight_ms),
                banner: Duration::from_millis(config.live.banner_ms),
                grid_size: config.live.grid_size,
            },
            poll_interval: Duration::from_millis(config.display.poll_interval_ms),
            housekeeping_interval: Duration::from_millis(config.display.housekeeping_interval_ms),
            status_message_ttl: Duration::from_millis(config.display.status_message_ms),
        }
    }

    /// Overrides the configured role.
    pub fn with_role(mut self, role: PlaybackRole) -> Self {
        self.role = role;
        self
    }
}

/// Immutable display state handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    pub mode: DisplayMode,
    pub role: PlaybackRole,
    pub playback: PlaybackStatus,
    /// `None` when no queue exists.
    pub queue: Option<QueueStatus>,
    pub goal: GoalProgress,
    pub projection: ProjectionView,
    pub theme: ThemeConfig,
    pub logo: Option<LogoConfig>,
    pub status_message: Option<String>,
}

/// Runs one display instance until cancelled.
pub struct DisplayRuntime {
    store: Arc<dyn DisplayStore>,
    events: broadcast::Receiver<StoreEvent>,
    settings: RuntimeSettings,
    scheduler: PlaybackScheduler,
    goal: GoalTracker,
    projection: Projection,
    theme: ThemeConfig,
    logo: Option<LogoConfig>,
    status: Option<(String, Instant)>,
    snapshots: watch::Sender<DisplaySnapshot>,
}

impl DisplayRuntime {
    /// `events` should be subscribed before the store watcher's first poll
    /// so the initial state is not missed.
    pub fn new(
        store: Arc<dyn DisplayStore>,
        events: broadcast::Receiver<StoreEvent>,
        settings: RuntimeSettings,
    ) -> Self {
        let scheduler = PlaybackScheduler::new(
            settings.role,
            settings.cadence.warmup,
            settings.cadence.interval,
        );
        let projection = Projection::new(settings.mode, &settings.projection);
        let initial = DisplaySnapshot {
            mode: settings.mode,
            role: settings.role,
            playback: PlaybackStatus::Idle,
            queue: None,
            goal: GoalProgress::default(),
            projection: projection.view(),
            theme: ThemeConfig::default(),
            logo: None,
            status_message: None,
        };
        let (snapshots, _) = watch::channel(initial);

        Self {
            store,
            events,
            goal: GoalTracker::new(settings.cadence.total_mode),
            settings,
            scheduler,
            projection,
            theme: ThemeConfig::default(),
            logo: None,
            status: None,
            snapshots,
        }
    }

    /// A receiver for display snapshots. Can be called any number of times.
    pub fn snapshots(&self) -> watch::Receiver<DisplaySnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let mut housekeeping = tokio::time::interval(self.settings.housekeeping_interval);
        housekeeping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            mode = %self.settings.mode,
            role = %self.settings.role,
            "display runtime started"
        );

        loop {
            let deadline = self.scheduler.next_deadline();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = self.events.recv() => match event {
                    Ok(event) => self.on_store_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "display fell behind store events, reloading");
                        self.resync().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("store event bus closed");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.reveal_due().await;
                }
                _ = housekeeping.tick() => self.housekeep(Instant::now()),
            }
            self.publish();
        }
        info!(mode = %self.settings.mode, "display runtime stopped");
    }

    fn on_store_event(&mut self, event: StoreEvent) {
        let now = Instant::now();
        match event {
            StoreEvent::QueueChanged(queue) => {
                let events = self.scheduler.observe(queue.as_ref(), now);
                self.apply(events, now);
            }
            StoreEvent::GoalChanged(goal) => {
                let target = goal.map(|g| g.target).unwrap_or(0.0);
                if self.goal.set_target(target) {
                    debug!(target, "goal target changed");
                }
            }
            StoreEvent::LogoChanged(logo) => self.logo = logo,
            StoreEvent::ThemeChanged(theme) => self.theme = theme.unwrap_or_default(),
            StoreEvent::ReadFailed { key, message } => {
                self.set_status(format!("Failed to load {key}: {message}"), now);
            }
        }
    }

    /// Re-reads the queue and goal directly after missing bus events.
    async fn resync(&mut self) {
        match self.store.load_queue().await {
            Ok(queue) => self.on_store_event(StoreEvent::QueueChanged(queue)),
            Err(e) => self.set_status(e.to_string(), Instant::now()),
        }
        match self.store.load_goal().await {
            Ok(goal) => self.on_store_event(StoreEvent::GoalChanged(goal)),
            Err(e) => self.set_status(e.to_string(), Instant::now()),
        }
    }

    async fn reveal_due(&mut self) {
        let Some(index) = self.scheduler.due(Instant::now()) else {
            return;
        };
        match self.store.reveal_at(index).await {
            Ok(outcome) => {
                let now = Instant::now();
                let events = self.scheduler.on_outcome(outcome, now);
                self.apply(events, now);
            }
            Err(e) => {
                let now = Instant::now();
                warn!(index, error = %e, "reveal failed, retrying at next slot");
                self.scheduler.on_reveal_failed(now);
                self.set_status(format!("Reveal failed: {e}"), now);
            }
        }
    }

    fn apply(&mut self, events: Vec<PlaybackEvent>, now: Instant) {
        for event in events {
            match event {
                PlaybackEvent::Revealed {
                    index,
                    donation,
                    source,
                } => {
                    info!(
                        index,
                        name = %donation.name,
                        amount = donation.amount,
                        %source,
                        "donation revealed"
                    );
                    self.goal.add(donation.amount);
                    self.projection.push(donation, now);
                }
                PlaybackEvent::Rebased {
                    cursor,
                    revealed_total,
                } => {
                    self.goal.rebase(revealed_total);
                    if cursor == 0 {
                        self.projection.clear();
                    }
                }
                PlaybackEvent::Started { first_reveal_at } => {
                    info!(
                        first_reveal_in_ms = first_reveal_at.saturating_duration_since(now).as_millis() as u64,
                        "playback active"
                    );
                }
                PlaybackEvent::Stopped { reason } => info!(%reason, "playback idle"),
            }
        }
    }

    fn housekeep(&mut self, now: Instant) {
        self.projection.expire(now);
        if let Some((_, shown_at)) = &self.status
            && now.saturating_duration_since(*shown_at) >= self.settings.status_message_ttl
        {
            self.status = None;
        }
    }

    fn set_status(&mut self, message: String, now: Instant) {
        warn!(status = %message, "display status message");
        self.status = Some((message, now));
    }

    fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            mode: self.settings.mode,
            role: self.settings.role,
            playback: self.scheduler.state().status(),
            queue: self.scheduler.queue().map(DonationQueue::status),
            goal: self.goal.progress(),
            projection: self.projection.view(),
            theme: self.theme.clone(),
            logo: self.logo.clone(),
            status_message: self.status.as_ref().map(|(m, _)| m.clone()),
        }
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledgewall_core::DonationGoal;
    use pledgewall_test_utils::{MemoryStore, fixtures};

    fn settings(mode: DisplayMode) -> RuntimeSettings {
        RuntimeSettings::from_config(&PledgewallConfig::default(), mode)
    }

    fn runtime(store: MemoryStore, mode: DisplayMode) -> (DisplayRuntime, broadcast::Sender<StoreEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (DisplayRuntime::new(Arc::new(store), rx, settings(mode)), tx)
    }

    #[test]
    fn settings_follow_mode() {
        let ticker = settings(DisplayMode::Ticker);
        assert_eq!(ticker.cadence.interval, Duration::from_millis(5000));
        assert_eq!(ticker.projection.max_visible, 5);

        let live = settings(DisplayMode::Live).with_role(PlaybackRole::Follower);
        assert_eq!(live.cadence.interval, Duration::from_millis(4000));
        assert_eq!(live.role, PlaybackRole::Follower);
        assert_eq!(live.status_message_ttl, Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn reload_at_cursor_derives_goal_from_prefix() {
        let store = MemoryStore::with_queue(&fixtures::queue_at(&[10.0, 25.0], 1, false)).await;
        let (mut rt, _tx) = runtime(store.clone(), DisplayMode::Live);

        rt.on_store_event(StoreEvent::GoalChanged(Some(DonationGoal::with_target(100.0).unwrap())));
        rt.on_store_event(StoreEvent::QueueChanged(store.load_queue().await.unwrap()));
        rt.publish();

        let snapshot = rt.snapshots().borrow().clone();
        assert_eq!(snapshot.goal.current, 10.0);
        assert_eq!(snapshot.goal.progress_percent, 10.0);
        assert_eq!(snapshot.playback, PlaybackStatus::Idle);
        assert_eq!(snapshot.queue.unwrap().processed_donations, 1);
        assert_eq!(snapshot.projection.visible(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn read_failure_shows_status_then_dismisses_it() {
        let (mut rt, _tx) = runtime(MemoryStore::new(), DisplayMode::Ticker);
        let start = Instant::now();
        rt.on_store_event(StoreEvent::ReadFailed {
            key: "eventmate_goal".into(),
            message: "bad json".into(),
        });
        rt.publish();
        let message = rt.snapshots().borrow().status_message.clone();
        assert_eq!(message.as_deref(), Some("Failed to load eventmate_goal: bad json"));

        rt.housekeep(start + Duration::from_millis(4999));
        assert!(rt.snapshot().status_message.is_some());
        rt.housekeep(start + Duration::from_millis(5000));
        assert!(rt.snapshot().status_message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_theme_falls_back_to_default() {
        let (mut rt, _tx) = runtime(MemoryStore::new(), DisplayMode::Live);
        let ocean = ThemeConfig::preset("Ocean Blue").unwrap();
        rt.on_store_event(StoreEvent::ThemeChanged(Some(ocean.clone())));
        assert_eq!(rt.snapshot().theme, ocean);

        rt.on_store_event(StoreEvent::ThemeChanged(None));
        assert_eq!(rt.snapshot().theme, ThemeConfig::default());
    }

    #[tokio::test(start_paused = true)]
    async fn due_reveal_updates_goal_and_projection() {
        let store = MemoryStore::with_queue(&fixtures::active_queue(&[10.0, 25.0])).await;
        let (mut rt, _tx) = runtime(store.clone(), DisplayMode::Ticker);

        rt.on_store_event(StoreEvent::QueueChanged(store.load_queue().await.unwrap()));
        assert_eq!(rt.snapshot().playback, PlaybackStatus::Scheduled);

        tokio::time::advance(Duration::from_millis(1000)).await;
        rt.reveal_due().await;

        let snapshot = rt.snapshot();
        assert_eq!(snapshot.goal.current, 10.0);
        assert_eq!(snapshot.projection.visible(), 1);
        assert_eq!(snapshot.queue.unwrap().processed_donations, 1);
        assert_eq!(store.load_queue().await.unwrap().unwrap().current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_snapshot_keeps_queue_status_in_step_with_goal() {
        let store = MemoryStore::with_queue(&fixtures::active_queue(&[10.0, 25.0])).await;
        let (mut rt, _tx) = runtime(store.clone(), DisplayMode::Ticker);
        let before_reveal = store.load_queue().await.unwrap();
        rt.on_store_event(StoreEvent::QueueChanged(before_reveal.clone()));

        tokio::time::advance(Duration::from_millis(1000)).await;
        rt.reveal_due().await;

        // A watcher poll that raced the reveal delivers the old cursor.
        rt.on_store_event(StoreEvent::QueueChanged(before_reveal));
        let snapshot = rt.snapshot();
        assert_eq!(snapshot.goal.current, 10.0);
        assert_eq!(snapshot.queue.unwrap().processed_donations, 1);
        assert_eq!(snapshot.playback, PlaybackStatus::Scheduled);
    }

    #[tokio::test(start_paused = true)]
    #[tracing_test::traced_test]
    async fn catch_up_reveals_are_logged_as_observed() {
        let store = MemoryStore::with_queue(&fixtures::active_queue(&[10.0, 25.0])).await;
        let (mut rt, _tx) = runtime(store.clone(), DisplayMode::Live);
        rt.on_store_event(StoreEvent::QueueChanged(store.load_queue().await.unwrap()));

        // Another display reveals both donations.
        store.reveal_at(0).await.unwrap();
        store.reveal_at(1).await.unwrap();
        rt.on_store_event(StoreEvent::QueueChanged(store.load_queue().await.unwrap()));

        let snapshot = rt.snapshot();
        assert_eq!(snapshot.goal.current, 35.0);
        assert_eq!(snapshot.playback, PlaybackStatus::Idle);
        assert!(logs_contain("donation revealed"));
        assert!(logs_contain("source=observed"));
    }

    #[tokio::test(start_paused = true)]
    async fn corrupt_queue_during_reveal_keeps_running() {
        let store = MemoryStore::with_queue(&fixtures::active_queue(&[10.0])).await;
        let (mut rt, _tx) = runtime(store.clone(), DisplayMode::Ticker);
        rt.on_store_event(StoreEvent::QueueChanged(store.load_queue().await.unwrap()));

        store.put_raw("donation_queue", "{not json").await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        rt.reveal_due().await;

        let snapshot = rt.snapshot();
        assert_eq!(snapshot.playback, PlaybackStatus::Scheduled);
        assert!(
            snapshot
                .status_message
                .is_some_and(|m| m.starts_with("Reveal failed"))
        );
        assert_eq!(snapshot.goal.current, 0.0);
    }
}
