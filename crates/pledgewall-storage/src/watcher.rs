// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store watcher: polls the shared store and publishes changes on the bus.
//!
//! One watcher runs per process. Subscribers see a change at most one poll
//! interval after it was written by any process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pledgewall_bus::{EventBus, StoreEvent};
use pledgewall_core::{DisplayStore, PledgeError, keys};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Last value seen for one record. The outer `None` means never observed.
type Seen<T> = Option<Option<T>>;

/// Records `value` and reports whether it differs from the previous observation.
fn changed<T: PartialEq + Clone>(seen: &mut Seen<T>, value: &Option<T>) -> bool {
    if seen.as_ref() == Some(value) {
        return false;
    }
    *seen = Some(value.clone());
    true
}

/// Polls a [`DisplayStore`] and publishes a [`StoreEvent`] per changed record.
pub struct StoreWatcher {
    store: Arc<dyn DisplayStore>,
    bus: EventBus<StoreEvent>,
    interval: Duration,
    queue: Seen<pledgewall_core::DonationQueue>,
    goal: Seen<pledgewall_core::DonationGoal>,
    logo: Seen<pledgewall_core::LogoConfig>,
    theme: Seen<pledgewall_core::ThemeConfig>,
    /// Last error reported per key, so a persistent failure is published once.
    failures: HashMap<&'static str, String>,
}

impl StoreWatcher {
    pub fn new(store: Arc<dyn DisplayStore>, bus: EventBus<StoreEvent>, interval: Duration) -> Self {
        Self {
            store,
            bus,
            interval,
            queue: None,
            goal: None,
            logo: None,
            theme: None,
            failures: HashMap::new(),
        }
    }

    /// Reads every record once and publishes the ones that changed.
    ///
    /// Returns the number of events published.
    pub async fn poll_once(&mut self) -> usize {
        let mut events = Vec::new();

        match self.store.load_queue().await {
            Ok(queue) => {
                self.recovered(keys::QUEUE);
                if changed(&mut self.queue, &queue) {
                    events.push(StoreEvent::QueueChanged(queue));
                }
            }
            Err(e) => events.extend(self.failed(keys::QUEUE, e)),
        }

        match self.store.load_goal().await {
            Ok(goal) => {
                self.recovered(keys::GOAL);
                if changed(&mut self.goal, &goal) {
                    events.push(StoreEvent::GoalChanged(goal));
                }
            }
            Err(e) => events.extend(self.failed(keys::GOAL, e)),
        }

        match self.store.load_logo().await {
            Ok(logo) => {
                self.recovered(keys::LOGO);
                if changed(&mut self.logo, &logo) {
                    events.push(StoreEvent::LogoChanged(logo));
                }
            }
            Err(e) => events.extend(self.failed(keys::LOGO, e)),
        }

        match self.store.load_theme().await {
            Ok(theme) => {
                self.recovered(keys::THEME);
                if changed(&mut self.theme, &theme) {
                    events.push(StoreEvent::ThemeChanged(theme));
                }
            }
            Err(e) => events.extend(self.failed(keys::THEME, e)),
        }

        let published = events.len();
        for event in events {
            debug!(key = event.key(), "store change published");
            self.bus.publish(event);
        }
        published
    }

    fn recovered(&mut self, key: &'static str) {
        if self.failures.remove(key).is_some() {
            info!(key, "record readable again");
        }
    }

    fn failed(&mut self, key: &'static str, err: PledgeError) -> Option<StoreEvent> {
        let message = err.to_string();
        if self.failures.get(key) == Some(&message) {
            return None;
        }
        warn!(key, error = %message, "failed to read store record, keeping last good value");
        self.failures.insert(key, message.clone());
        Some(StoreEvent::ReadFailed {
            key: key.to_string(),
            message,
        })
    }

    /// Polls until `cancel` fires. The first poll happens immediately.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            store = self.store.name(),
            interval_ms = self.interval.as_millis() as u64,
            "store watcher started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
        debug!("store watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteStore;
    use crate::queries::kv;
    use pledgewall_core::{Donation, DonationGoal};
    use tokio::sync::broadcast::error::TryRecvError;

    async fn setup() -> (SqliteStore, StoreWatcher, tokio::sync::broadcast::Receiver<StoreEvent>) {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let bus = EventBus::default();
        let rx = bus.subscribe();
        let watcher = StoreWatcher::new(Arc::new(store.clone()), bus, Duration::from_millis(10));
        (store, watcher, rx)
    }

    #[tokio::test]
    async fn first_poll_publishes_every_record() {
        let (_store, mut watcher, mut rx) = setup().await;
        assert_eq!(watcher.poll_once().await, 4);
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::QueueChanged(None));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::GoalChanged(None));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::LogoChanged(None));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ThemeChanged(None));
    }

    #[tokio::test]
    async fn only_changed_records_are_published() {
        let (store, mut watcher, mut rx) = setup().await;
        watcher.poll_once().await;
        while rx.try_recv().is_ok() {}

        assert_eq!(watcher.poll_once().await, 0);

        let goal = DonationGoal::with_target(100.0).unwrap();
        store.save_goal(&goal).await.unwrap();
        assert_eq!(watcher.poll_once().await, 1);
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::GoalChanged(Some(goal)));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn corrupt_record_is_reported_once_and_last_value_kept() {
        let (store, mut watcher, mut rx) = setup().await;
        store
            .append_donations(&[Donation::new("Alice", 5.0).unwrap()])
            .await
            .unwrap();
        watcher.poll_once().await;
        while rx.try_recv().is_ok() {}

        kv::put(store.database(), keys::QUEUE, "[broken".into())
            .await
            .unwrap();
        assert_eq!(watcher.poll_once().await, 1);
        let StoreEvent::ReadFailed { key, .. } = rx.try_recv().unwrap() else {
            panic!("expected ReadFailed");
        };
        assert_eq!(key, keys::QUEUE);
        assert!(logs_contain("keeping last good value"));

        // Same failure again: nothing new.
        assert_eq!(watcher.poll_once().await, 0);

        store.reset_queue().await.unwrap();
        assert_eq!(watcher.poll_once().await, 1);
        assert!(matches!(
            rx.try_recv().unwrap(),
            StoreEvent::QueueChanged(Some(q)) if q.is_empty()
        ));
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let (store, watcher, mut rx) = setup().await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watcher.run(cancel.clone()));

        assert_eq!(rx.recv().await.unwrap(), StoreEvent::QueueChanged(None));
        store
            .append_donations(&[Donation::new("Bob", 1.0).unwrap()])
            .await
            .unwrap();

        loop {
            if let StoreEvent::QueueChanged(Some(q)) = rx.recv().await.unwrap() {
                assert_eq!(q.len(), 1);
                break;
            }
        }

        cancel.cancel();
        handle.await.unwrap();
    }
}
