// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, playback and admin layers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::queue::{Donation, DonationQueue};

/// Fixed keys of the shared key-value namespace.
pub mod keys {
    /// Donation queue record.
    pub const QUEUE: &str = "donation_queue";
    /// Goal record.
    pub const GOAL: &str = "eventmate_goal";
    /// Logo record.
    pub const LOGO: &str = "eventmate_logo";
    /// Theme record.
    pub const THEME: &str = "eventmate_theme";

    /// Every key owned by Pledgewall, in a stable order.
    pub const ALL: [&str; 4] = [QUEUE, GOAL, LOGO, THEME];
}

/// Which projection a display instance renders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayMode {
    /// Transient bubbles that float up and fade.
    Ticker,
    /// Banner plus persistent grid.
    Live,
}

/// Whether a display instance may advance the shared cursor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlaybackRole {
    /// Advances the cursor on its reveal timer.
    #[default]
    Revealer,
    /// Never writes; mirrors reveals made by another instance.
    Follower,
}

/// How the running total relates to the goal target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TotalMode {
    /// The total never exceeds the target.
    Capped,
    /// The total may run past the target.
    Uncapped,
}

/// A donation as held by a display projection, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDonation {
    #[serde(flatten)]
    pub donation: Donation,
    pub is_new: bool,
}

impl DisplayDonation {
    /// Wraps a freshly revealed donation, highlighted.
    pub fn fresh(donation: Donation) -> Self {
        Self {
            donation,
            is_new: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.donation.id
    }
}

/// Admin-facing summary of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub total_donations: usize,
    pub processed_donations: usize,
    pub is_active: bool,
}

/// Result of applying a reveal at a given cursor index.
///
/// Only [`RevealOutcome::Revealed`] changed the persisted queue, except
/// [`RevealOutcome::Exhausted`] which may have flipped `is_active` off.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    /// The donation at the requested index was revealed and the cursor advanced.
    Revealed {
        index: usize,
        donation: Donation,
        queue: DonationQueue,
    },
    /// The cursor is not at the requested index; nothing changed.
    Stale { queue: DonationQueue },
    /// The queue is paused; nothing changed.
    Inactive { queue: DonationQueue },
    /// Every donation has been revealed; the queue is now inactive.
    Exhausted { queue: DonationQueue },
    /// No queue exists.
    Missing,
}

impl RevealOutcome {
    /// The queue as persisted after the operation, if one exists.
    pub fn queue(&self) -> Option<&DonationQueue> {
        match self {
            RevealOutcome::Revealed { queue, .. }
            | RevealOutcome::Stale { queue }
            | RevealOutcome::Inactive { queue }
            | RevealOutcome::Exhausted { queue } => Some(queue),
            RevealOutcome::Missing => None,
        }
    }

    /// Returns `true` if this outcome changed persisted state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RevealOutcome::Revealed { .. } | RevealOutcome::Exhausted { .. }
        )
    }
}
