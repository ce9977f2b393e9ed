// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running total against the fundraising target.

use pledgewall_core::TotalMode;
use serde::Serialize;

/// Goal state as shown on a display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub target: f64,
    pub current: f64,
    pub progress_percent: f64,
}

/// Tracks the running total of revealed donations.
///
/// The uncapped sum is kept internally; in [`TotalMode::Capped`] the shown
/// total is clamped to the target. Capping the sum once is the same as
/// capping after every non-negative increment, so a target change never
/// loses amounts. With no target set (target 0) nothing is capped.
#[derive(Debug, Clone)]
pub struct GoalTracker {
    mode: TotalMode,
    target: f64,
    revealed_total: f64,
}

impl GoalTracker {
    pub fn new(mode: TotalMode) -> Self {
        Self {
            mode,
            target: 0.0,
            revealed_total: 0.0,
        }
    }

    /// Replaces the target. Returns `true` if it changed.
    pub fn set_target(&mut self, target: f64) -> bool {
        let target = if target.is_finite() { target.max(0.0) } else { 0.0 };
        if target == self.target {
            return false;
        }
        self.target = target;
        true
    }

    /// Re-derives the total from `sum(donations[..cursor])`.
    pub fn rebase(&mut self, revealed_total: f64) {
        self.revealed_total = revealed_total.max(0.0);
    }

    /// Adds one revealed amount.
    pub fn add(&mut self, amount: f64) {
        self.revealed_total += amount.max(0.0);
    }

    /// The total as displayed.
    pub fn current(&self) -> f64 {
        match self.mode {
            TotalMode::Capped if self.target > 0.0 => self.revealed_total.min(self.target),
            _ => self.revealed_total,
        }
    }

    /// `min(current / target * 100, 100)`, or 0 without a target.
    pub fn progress_percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.current() / self.target * 100.0).min(100.0)
    }

    pub fn progress(&self) -> GoalProgress {
        GoalProgress {
            target: self.target,
            current: self.current(),
            progress_percent: self.progress_percent(),
        }
    }
}
