// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Internal typed event bus for Pledgewall.
//!
//! One store watcher publishes [`StoreEvent`]s; every projection in the same
//! process subscribes. Delivery is fan-out over a tokio broadcast channel, so
//! each subscriber sees every event in publish order.

pub mod events;

pub use events::StoreEvent;

use tokio::sync::broadcast;
use tracing::trace;

/// Default channel capacity. A lagging subscriber skips the oldest events.
pub const DEFAULT_CAPACITY: usize = 64;

/// Broadcast bus for a single event type.
#[derive(Debug)]
pub struct EventBus<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Registers a new subscriber. It only sees events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it; zero when nobody
    /// is listening, which is not an error.
    pub fn publish(&self, event: T) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("event published with no subscribers");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
