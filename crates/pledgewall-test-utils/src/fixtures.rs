// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for donations and queues used across test suites.

use pledgewall_core::{Donation, DonationQueue};

/// One donation per amount, named `donor-0`, `donor-1`, ...
pub fn donations(amounts: &[f64]) -> Vec<Donation> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            Donation::new(format!("donor-{i}"), *amount).expect("fixture amounts are valid")
        })
        .collect()
}

/// Active queue at cursor zero.
pub fn active_queue(amounts: &[f64]) -> DonationQueue {
    queue_at(amounts, 0, true)
}

/// Queue with an explicit cursor and flag. The cursor is not validated.
pub fn queue_at(amounts: &[f64], current_index: usize, is_active: bool) -> DonationQueue {
    DonationQueue {
        donations: donations(amounts),
        current_index,
        is_active,
    }
}
