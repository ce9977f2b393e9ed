// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live wall projection: a "latest" banner plus a persistent grid.

use std::collections::VecDeque;
use std::time::Duration;

use pledgewall_core::{DisplayDonation, Donation};
use tokio::time::Instant;

/// Banner + grid state for the live wall.
///
/// A revealed donation occupies the banner for `banner_duration`, then moves
/// to the front of the grid. The grid keeps the most recent `grid_size`
/// donations, newest first.
#[derive(Debug)]
pub struct LiveWall {
    banner_duration: Duration,
    grid_size: usize,
    banner: Option<(DisplayDonation, Instant)>,
    grid: VecDeque<DisplayDonation>,
}

impl LiveWall {
    pub fn new(banner_duration: Duration, grid_size: usize) -> Self {
        Self {
            banner_duration,
            grid_size: grid_size.max(1),
            banner: None,
            grid: VecDeque::new(),
        }
    }

    /// Shows a revealed donation in the banner. A donation still in the
    /// banner is moved to the grid first.
    pub fn push(&mut self, donation: Donation, now: Instant) {
        self.flush_banner();
        self.banner = Some((DisplayDonation::fresh(donation), now));
    }

    /// Moves the banner into the grid once its time is up.
    ///
    /// Returns `true` if anything visible changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match &self.banner {
            Some((_, shown_at)) if now.saturating_duration_since(*shown_at) >= self.banner_duration => {
                self.flush_banner();
                true
            }
            _ => false,
        }
    }

    fn flush_banner(&mut self) {
        if let Some((mut donation, _)) = self.banner.take() {
            donation.is_new = false;
            self.grid.push_front(donation);
            self.grid.truncate(self.grid_size);
        }
    }

    pub fn clear(&mut self) {
        self.banner = None;
        self.grid.clear();
    }

    pub fn banner(&self) -> Option<&DisplayDonation> {
        self.banner.as_ref().map(|(d, _)| d)
    }

    /// Grid entries, most recent first.
    pub fn grid(&self) -> impl Iterator<Item = &DisplayDonation> {
        self.grid.iter()
    }

    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }
}
