// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticker projection: short-lived donation bubbles.

use std::collections::VecDeque;
use std::time::Duration;

use pledgewall_core::{DisplayDonation, Donation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::time::Instant;

/// Horizontal placement range, in percent of the display width.
const X_RANGE: std::ops::RangeInclusive<f64> = 35.0..=65.0;

/// One bubble as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bubble {
    #[serde(flatten)]
    pub donation: DisplayDonation,
    pub x_percent: f64,
    pub y_percent: f64,
}

#[derive(Debug, Clone)]
struct Entry {
    donation: DisplayDonation,
    x_percent: f64,
    shown_at: Instant,
}

/// Bounded list of recently revealed donations.
#[derive(Debug)]
pub struct TickerProjection {
    max_visible: usize,
    lifetime: Duration,
    highlight: Duration,
    entries: VecDeque<Entry>,
    rng: StdRng,
}

impl TickerProjection {
    pub fn new(max_visible: usize, lifetime: Duration, highlight: Duration) -> Self {
        Self::with_rng(max_visible, lifetime, highlight, StdRng::from_entropy())
    }

    /// Uses the given generator for horizontal jitter.
    pub fn with_rng(max_visible: usize, lifetime: Duration, highlight: Duration, rng: StdRng) -> Self {
        Self {
            max_visible: max_visible.max(1),
            lifetime,
            highlight,
            entries: VecDeque::new(),
            rng,
        }
    }

    /// Adds a freshly revealed donation, evicting the oldest beyond the cap.
    pub fn push(&mut self, donation: Donation, now: Instant) {
        let x_percent = self.rng.gen_range(X_RANGE);
        self.entries.push_back(Entry {
            donation: DisplayDonation::fresh(donation),
            x_percent,
            shown_at: now,
        });
        while self.entries.len() > self.max_visible {
            self.entries.pop_front();
        }
    }

    /// Clears expired highlights and drops expired bubbles.
    ///
    /// Returns `true` if anything visible changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        let lifetime = self.lifetime;
        self.entries
            .retain(|e| now.saturating_duration_since(e.shown_at) < lifetime);
        let mut changed = self.entries.len() != before;

        for entry in &mut self.entries {
            if entry.donation.is_new && now.saturating_duration_since(entry.shown_at) >= self.highlight {
                entry.donation.is_new = false;
                changed = true;
            }
        }
        changed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bubbles oldest first, with their screen positions.
    pub fn bubbles(&self) -> Vec<Bubble> {
        let n = self.entries.len();
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| Bubble {
                donation: e.donation.clone(),
                x_percent: e.x_percent,
                y_percent: vertical_slot(i, n),
            })
            .collect()
    }
}

/// Vertical position of entry `i` out of `n`, in percent: `(120 / (n + 1)) * (i + 1)`.
pub fn vertical_slot(i: usize, n: usize) -> f64 {
    (120.0 / (n as f64 + 1.0)) * (i as f64 + 1.0)
}
