// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Donations and the shared donation queue.
//!
//! Every queue mutation is a pure function on [`DonationQueue`] so that each
//! store backend applies exactly the same transition inside its own
//! transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PledgeError;
use crate::types::{QueueStatus, RevealOutcome};

/// A single donation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    /// Opaque unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    /// Non-negative currency amount.
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Donation {
    /// Creates a donation with a fresh id and the current timestamp.
    ///
    /// Rejects negative or non-finite amounts.
    pub fn new(name: impl Into<String>, amount: f64) -> Result<Self, PledgeError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(PledgeError::InvalidInput(format!(
                "donation amount must be a non-negative number, got {amount}"
            )));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            timestamp: Utc::now(),
        })
    }
}

/// Ordered, append-only donations plus the reveal cursor and play/pause flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationQueue {
    pub donations: Vec<Donation>,
    /// Number of donations already revealed; `0..=donations.len()`.
    pub current_index: usize,
    pub is_active: bool,
}

impl DonationQueue {
    /// Empty, inactive queue with the cursor at zero.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.donations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.donations.is_empty()
    }

    /// Donations not yet revealed.
    pub fn pending(&self) -> usize {
        self.len().saturating_sub(self.current_index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.len()
    }

    /// Donations already revealed, in reveal order.
    pub fn revealed(&self) -> &[Donation] {
        &self.donations[..self.current_index.min(self.len())]
    }

    /// Sum of every revealed amount.
    pub fn revealed_total(&self) -> f64 {
        self.revealed().iter().map(|d| d.amount).sum()
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            total_donations: self.len(),
            processed_donations: self.current_index,
            is_active: self.is_active,
        }
    }

    /// Clamps an out-of-range cursor back into `0..=len`.
    ///
    /// Returns `true` if the cursor had to be corrected.
    pub fn normalize(&mut self) -> bool {
        if self.current_index > self.len() {
            warn!(
                current_index = self.current_index,
                len = self.len(),
                "queue cursor past end of donations, clamping"
            );
            self.current_index = self.len();
            return true;
        }
        false
    }

    /// Appends donations at the end, preserving their order.
    pub fn append(&mut self, donations: impl IntoIterator<Item = Donation>) {
        self.donations.extend(donations);
    }

    /// Applies a reveal at `index`.
    ///
    /// The transition is idempotent: it only advances when the queue is
    /// active and the cursor sits exactly at `index`, so replaying a reveal
    /// for an already-consumed index never changes anything. Revealing the
    /// last donation also switches the queue off.
    pub fn reveal_at(&mut self, index: usize) -> RevealOutcome {
        if !self.is_active {
            return RevealOutcome::Inactive {
                queue: self.clone(),
            };
        }

        if self.is_exhausted() {
            self.is_active = false;
            return RevealOutcome::Exhausted {
                queue: self.clone(),
            };
        }

        if self.current_index != index {
            return RevealOutcome::Stale {
                queue: self.clone(),
            };
        }

        let donation = self.donations[index].clone();
        self.current_index += 1;
        if self.is_exhausted() {
            self.is_active = false;
        }

        RevealOutcome::Revealed {
            index,
            donation,
            queue: self.clone(),
        }
    }
}

/// Decodes a persisted queue, clamping its cursor.
pub fn decode_queue(raw: &str) -> Result<DonationQueue, PledgeError> {
    let mut queue: DonationQueue =
        serde_json::from_str(raw).map_err(|source| PledgeError::CorruptRecord {
            key: crate::types::keys::QUEUE.to_string(),
            source,
        })?;
    queue.normalize();
    Ok(queue)
}
