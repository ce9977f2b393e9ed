// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pledgewall demo`: seeds the queue with random donations.

use pledgewall_core::{DisplayStore, Donation, PledgeError};
use rand::Rng;
use rand::seq::SliceRandom;

const DEMO_NAMES: [&str; 16] = [
    "Bruce Banner",
    "Tony Stark",
    "Steve Rogers",
    "Betty Carter",
    "Natasha Romanoff",
    "Peter Parker",
    "Carol Danvers",
    "Stephen Strange",
    "Wanda Maximoff",
    "Scott Lang",
    "Hope van Dyne",
    "T'Challa",
    "Shuri",
    "Sam Wilson",
    "Bucky Barnes",
    "Clint Barton",
];

const MIN_AMOUNT: u32 = 5;
const MAX_AMOUNT: u32 = 5000;

/// `count` donations with random names and whole amounts in 5..=5000.
pub fn random_donations<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Result<Vec<Donation>, PledgeError> {
    (0..count)
        .map(|_| {
            let name = DEMO_NAMES.choose(rng).copied().unwrap_or("Anonymous");
            let amount = rng.gen_range(MIN_AMOUNT..=MAX_AMOUNT);
            Donation::new(name, f64::from(amount))
        })
        .collect()
}

pub async fn seed(store: &dyn DisplayStore, count: usize) -> Result<String, PledgeError> {
    let donations = random_donations(&mut rand::thread_rng(), count)?;
    let queue = store.append_donations(&donations).await?;
    Ok(format!(
        "Added {count} demo donations ({} in queue)",
        queue.len()
    ))
}
