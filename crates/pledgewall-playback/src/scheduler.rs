// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Playback scheduler: decides when this display reveals the next donation.
//!
//! The scheduler is a synchronous state machine. The display runtime feeds it
//! observed queue snapshots ([`PlaybackScheduler::observe`]), asks it which
//! index is due ([`PlaybackScheduler::due`]), performs the store's
//! compare-and-set `reveal_at`, and hands the outcome back
//! ([`PlaybackScheduler::on_outcome`]). Every call returns the
//! [`PlaybackEvent`]s the caller must apply, in order.
//!
//! A local cursor records how many donations this instance has already
//! emitted. Indices below it are never emitted again; indices consumed by
//! another display are emitted once as catch-up when observed.

use std::time::Duration;

use pledgewall_core::{Donation, DonationQueue, PlaybackRole, RevealOutcome};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, trace};

/// States in the playback FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Queue absent or inactive.
    Idle,
    /// Queue active; the next reveal is due at `next_reveal_at`.
    Scheduled { next_reveal_at: Instant },
    /// A reveal for the slot due at `deadline` is in flight.
    Revealing { deadline: Instant },
}

impl SchedulerState {
    pub fn status(&self) -> PlaybackStatus {
        match self {
            SchedulerState::Idle => PlaybackStatus::Idle,
            SchedulerState::Scheduled { .. } => PlaybackStatus::Scheduled,
            SchedulerState::Revealing { .. } => PlaybackStatus::Revealing,
        }
    }
}

/// [`SchedulerState`] without timing, for snapshots and logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Scheduled,
    Revealing,
}

/// Who moved the shared cursor past a revealed donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RevealSource {
    /// This instance's own `reveal_at` committed.
    Local,
    /// Another display advanced the cursor; emitted as catch-up.
    Observed,
}

/// Why playback went idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StopReason {
    /// The queue was switched off.
    Paused,
    /// The last donation was revealed.
    Exhausted,
    /// The queue record was removed.
    Cleared,
}

/// Something the display must apply after a scheduler transition.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Show this donation and add it to the running total.
    Revealed {
        index: usize,
        donation: Donation,
        source: RevealSource,
    },
    /// The local cursor was re-based; re-derive the total from scratch.
    Rebased { cursor: usize, revealed_total: f64 },
    /// Playback became active; the first reveal is due at `first_reveal_at`.
    Started { first_reveal_at: Instant },
    Stopped { reason: StopReason },
}

/// Cadence-driven reveal scheduler for one display instance.
#[derive(Debug)]
pub struct PlaybackScheduler {
    role: PlaybackRole,
    warmup: Duration,
    interval: Duration,
    state: SchedulerState,
    /// Donations already emitted by this instance. `None` until the first observation.
    cursor: Option<usize>,
    /// Latest queue accepted from any source.
    known: Option<DonationQueue>,
    /// `(len, current_index)` of the last snapshot accepted from the store watcher.
    observed: Option<(usize, usize)>,
}

impl PlaybackScheduler {
    pub fn new(role: PlaybackRole, warmup: Duration, interval: Duration) -> Self {
        Self {
            role,
            warmup,
            interval,
            state: SchedulerState::Idle,
            cursor: None,
            known: None,
            observed: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The last queue this scheduler accepted. Stale snapshots never replace it.
    pub fn queue(&self) -> Option<&DonationQueue> {
        self.known.as_ref()
    }

    /// When the runtime should wake up to reveal. Followers never do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.role, self.state) {
            (PlaybackRole::Revealer, SchedulerState::Scheduled { next_reveal_at }) => {
                Some(next_reveal_at)
            }
            _ => None,
        }
    }

    /// Applies a queue snapshot read by the store watcher (`None` = no queue).
    pub fn observe(&mut self, queue: Option<&DonationQueue>, now: Instant) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        match queue {
            None => {
                self.known = None;
                self.observed = None;
                if self.cursor.take().is_some() {
                    events.push(PlaybackEvent::Rebased {
                        cursor: 0,
                        revealed_total: 0.0,
                    });
                }
                self.stop(StopReason::Cleared, &mut events);
            }
            Some(queue) => {
                if self.is_stale(queue) {
                    debug!(
                        observed_index = queue.current_index,
                        local_cursor = ?self.cursor,
                        "ignoring snapshot older than our last reveal"
                    );
                    return events;
                }
                self.observed = Some((queue.len(), queue.current_index));
                self.apply(queue, now, stop_reason(queue), &mut events);
            }
        }
        events
    }

    /// Returns the index to reveal if the deadline has passed, moving to
    /// [`SchedulerState::Revealing`]. The caller must report the result via
    /// [`on_outcome`](Self::on_outcome) or [`on_reveal_failed`](Self::on_reveal_failed).
    pub fn due(&mut self, now: Instant) -> Option<usize> {
        if self.role != PlaybackRole::Revealer {
            return None;
        }
        match self.state {
            SchedulerState::Scheduled { next_reveal_at } if now >= next_reveal_at => {
                let index = self.cursor?;
                self.state = SchedulerState::Revealing {
                    deadline: next_reveal_at,
                };
                trace!(index, "reveal due");
                Some(index)
            }
            _ => None,
        }
    }

    /// Applies the store's answer to a `reveal_at` issued after [`due`](Self::due).
    pub fn on_outcome(&mut self, outcome: RevealOutcome, now: Instant) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        match outcome {
            RevealOutcome::Revealed {
                index,
                donation,
                queue,
            } => {
                if self.cursor == Some(index) {
                    events.push(PlaybackEvent::Revealed {
                        index,
                        donation,
                        source: RevealSource::Local,
                    });
                    self.cursor = Some(index + 1);
                }
                self.apply(&queue, now, stop_reason(&queue), &mut events);
            }
            RevealOutcome::Stale { queue } | RevealOutcome::Inactive { queue } => {
                self.apply(&queue, now, stop_reason(&queue), &mut events);
            }
            RevealOutcome::Exhausted { queue } => {
                self.apply(&queue, now, StopReason::Exhausted, &mut events);
            }
            RevealOutcome::Missing => return self.observe(None, now),
        }
        events
    }

    /// The store call failed; retry at the next slot.
    pub fn on_reveal_failed(&mut self, now: Instant) {
        if let SchedulerState::Revealing { deadline } = self.state {
            self.state = SchedulerState::Scheduled {
                next_reveal_at: self.next_after(deadline, now),
            };
        }
    }

    /// Fixed cadence: one interval after the previous slot, never in the past.
    fn next_after(&self, deadline: Instant, now: Instant) -> Instant {
        (deadline + self.interval).max(now)
    }

    /// A watcher snapshot is stale when it was read before one of our own
    /// reveals committed: same donations, cursor behind ours, yet not behind
    /// the previous watcher snapshot.
    fn is_stale(&self, queue: &DonationQueue) -> bool {
        let (Some(cursor), Some(known), Some((len, index))) =
            (self.cursor, self.known.as_ref(), self.observed)
        else {
            return false;
        };
        queue.current_index < cursor
            && queue.current_index >= index
            && queue.len() >= len
            && shares_prefix(queue, known)
    }

    /// Adopts `queue`. `idle_reason` is reported if it is inactive.
    fn apply(
        &mut self,
        queue: &DonationQueue,
        now: Instant,
        idle_reason: StopReason,
        events: &mut Vec<PlaybackEvent>,
    ) {
        self.sync_cursor(queue, events);
        self.known = Some(queue.clone());

        if !queue.is_active {
            self.stop(idle_reason, events);
            return;
        }

        match self.state {
            SchedulerState::Idle => {
                let first_reveal_at = now + self.warmup;
                self.state = SchedulerState::Scheduled {
                    next_reveal_at: first_reveal_at,
                };
                debug!(role = %self.role, "playback started");
                events.push(PlaybackEvent::Started { first_reveal_at });
            }
            SchedulerState::Scheduled { .. } => {}
            SchedulerState::Revealing { deadline } => {
                self.state = SchedulerState::Scheduled {
                    next_reveal_at: self.next_after(deadline, now),
                };
            }
        }
    }

    /// Moves the local cursor to the queue's cursor, emitting catch-up
    /// reveals when it moved forward over the same donations and a rebase
    /// otherwise.
    fn sync_cursor(&mut self, queue: &DonationQueue, events: &mut Vec<PlaybackEvent>) {
        let same_donations = self
            .known
            .as_ref()
            .is_some_and(|known| shares_prefix(queue, known));

        if let Some(cursor) = self.cursor
            && same_donations
            && queue.current_index >= cursor
        {
            if let Some(caught_up) = queue.revealed().get(cursor..) {
                for (offset, donation) in caught_up.iter().enumerate() {
                    events.push(PlaybackEvent::Revealed {
                        index: cursor + offset,
                        donation: donation.clone(),
                        source: RevealSource::Observed,
                    });
                }
            }
            self.cursor = Some(queue.current_index);
            return;
        }

        debug!(
            from = ?self.cursor,
            to = queue.current_index,
            "local cursor rebased"
        );
        self.cursor = Some(queue.current_index);
        events.push(PlaybackEvent::Rebased {
            cursor: queue.current_index,
            revealed_total: queue.revealed_total(),
        });
    }

    fn stop(&mut self, reason: StopReason, events: &mut Vec<PlaybackEvent>) {
        if self.state != SchedulerState::Idle {
            self.state = SchedulerState::Idle;
            debug!(%reason, "playback stopped");
            events.push(PlaybackEvent::Stopped { reason });
        }
    }
}

/// Why an inactive queue read from the store is idle.
fn stop_reason(queue: &DonationQueue) -> StopReason {
    if !queue.is_empty() && queue.is_exhausted() {
        StopReason::Exhausted
    } else {
        StopReason::Paused
    }
}

/// Whether the two queues agree on every donation both of them contain.
fn shares_prefix(a: &DonationQueue, b: &DonationQueue) -> bool {
    a.donations
        .iter()
        .zip(&b.donations)
        .all(|(x, y)| x.id == y.id)
}
