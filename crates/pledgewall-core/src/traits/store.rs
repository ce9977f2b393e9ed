// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for the shared key-value namespace (SQLite, in-memory).

use async_trait::async_trait;

use crate::error::PledgeError;
use crate::queue::{Donation, DonationQueue};
use crate::settings::{DonationGoal, LogoConfig, ThemeConfig};
use crate::types::RevealOutcome;

/// Persistence shared by the admin and every display instance.
///
/// Read-modify-write operations (`append_donations`, `set_active`,
/// `toggle_active`, `reveal_at`) must be atomic with respect to every other
/// writer of the same backing store, including other processes.
/// `save_queue` is a plain overwrite: last writer wins.
///
/// Loads return `Ok(None)` for an absent record and
/// [`PledgeError::CorruptRecord`] for one that does not decode.
#[async_trait]
pub trait DisplayStore: Send + Sync + 'static {
    /// Human-readable backend name, for logs and status output.
    fn name(&self) -> &str;

    // --- Queue ---

    async fn load_queue(&self) -> Result<Option<DonationQueue>, PledgeError>;

    /// Overwrites the queue record.
    async fn save_queue(&self, queue: &DonationQueue) -> Result<(), PledgeError>;

    /// Appends donations to the queue, creating an empty inactive queue first if none exists.
    async fn append_donations(&self, donations: &[Donation]) -> Result<DonationQueue, PledgeError>;

    /// Sets the active flag. Returns `None` if no queue exists.
    async fn set_active(&self, active: bool) -> Result<Option<DonationQueue>, PledgeError>;

    /// Flips the active flag. Returns `None` if no queue exists.
    async fn toggle_active(&self) -> Result<Option<DonationQueue>, PledgeError>;

    /// Applies [`DonationQueue::reveal_at`] to the stored queue and persists the result.
    async fn reveal_at(&self, index: usize) -> Result<RevealOutcome, PledgeError>;

    /// Replaces the queue with an empty, inactive one.
    async fn reset_queue(&self) -> Result<(), PledgeError> {
        self.save_queue(&DonationQueue::empty()).await
    }

    // --- Settings ---

    async fn load_goal(&self) -> Result<Option<DonationGoal>, PledgeError>;

    async fn save_goal(&self, goal: &DonationGoal) -> Result<(), PledgeError>;

    async fn load_logo(&self) -> Result<Option<LogoConfig>, PledgeError>;

    async fn save_logo(&self, logo: &LogoConfig) -> Result<(), PledgeError>;

    async fn remove_logo(&self) -> Result<(), PledgeError>;

    async fn load_theme(&self) -> Result<Option<ThemeConfig>, PledgeError>;

    async fn save_theme(&self, theme: &ThemeConfig) -> Result<(), PledgeError>;

    /// Removes every record.
    async fn clear_all(&self) -> Result<(), PledgeError>;
}
