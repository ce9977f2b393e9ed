// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires a store watcher, an event bus and a display runtime together.

use std::sync::Arc;

use pledgewall_bus::EventBus;
use pledgewall_bus::events::StoreEvent;
use pledgewall_core::DisplayStore;
use pledgewall_storage::StoreWatcher;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::runtime::{DisplayRuntime, DisplaySnapshot, RuntimeSettings};

/// A running display: its snapshot feed and background tasks.
pub struct DisplayHandle {
    snapshots: watch::Receiver<DisplaySnapshot>,
    watcher: JoinHandle<()>,
    runtime: JoinHandle<()>,
}

impl DisplayHandle {
    pub fn snapshots(&self) -> watch::Receiver<DisplaySnapshot> {
        self.snapshots.clone()
    }

    /// Waits for both tasks to finish after the cancellation token fires.
    pub async fn join(self) {
        for (task, handle) in [("watcher", self.watcher), ("runtime", self.runtime)] {
            if let Err(e) = handle.await {
                warn!(task, error = %e, "display task ended abnormally");
            }
        }
    }
}

/// Spawns a store watcher and a display runtime on the current tokio runtime.
///
/// The runtime subscribes before the watcher's first poll, so it always sees
/// the initial state of every record.
pub fn spawn_display(
    store: Arc<dyn DisplayStore>,
    settings: RuntimeSettings,
    cancel: CancellationToken,
) -> DisplayHandle {
    let bus: EventBus<StoreEvent> = EventBus::default();
    let runtime = DisplayRuntime::new(Arc::clone(&store), bus.subscribe(), settings);
    let snapshots = runtime.snapshots();
    let watcher = StoreWatcher::new(store, bus, settings.poll_interval);

    DisplayHandle {
        snapshots,
        watcher: tokio::spawn(watcher.run(cancel.clone())),
        runtime: tokio::spawn(runtime.run(cancel)),
    }
}
