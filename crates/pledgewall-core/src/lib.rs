// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Pledgewall.
//!
//! This crate provides the domain types (donations, the shared queue, goal,
//! logo and theme records), the pure queue transitions every store applies,
//! the error type, and the [`DisplayStore`] trait that storage backends
//! implement.

pub mod error;
pub mod queue;
pub mod settings;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PledgeError;
pub use queue::{Donation, DonationQueue};
pub use settings::{DonationGoal, LogoConfig, LogoUpload, ThemeConfig};
pub use traits::DisplayStore;
pub use types::{
    DisplayDonation, DisplayMode, PlaybackRole, QueueStatus, RevealOutcome,
    TotalMode, keys,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pledge_error_variants_render() {
        let input = PledgeError::InvalidInput("amount must not be negative".into());
        assert_eq!(input.to_string(), "invalid input: amount must not be negative");

        let storage = PledgeError::storage(std::io::Error::other("disk"));
        assert!(storage.to_string().contains("disk"));

        let missing = PledgeError::NotFound("No donations in queue".into());
        assert_eq!(missing.to_string(), "No donations in queue");
    }

    #[test]
    fn enum_names_round_trip() {
        use std::str::FromStr;

        for mode in [DisplayMode::Ticker, DisplayMode::Live] {
            assert_eq!(DisplayMode::from_str(&mode.to_string()).unwrap(), mode);
        }
        assert_eq!(PlaybackRole::from_str("Follower").unwrap(), PlaybackRole::Follower);
        assert_eq!(TotalMode::from_str("capped").unwrap(), TotalMode::Capped);
        assert_eq!(PlaybackRole::default(), PlaybackRole::Revealer);
    }

    #[test]
    fn enums_serialize_lowercase() {
        let json = serde_json::to_string(&TotalMode::Uncapped).unwrap();
        assert_eq!(json, "\"uncapped\"");
    }

    #[test]
    fn display_donation_flattens_donation_fields() {
        let donation = Donation::new("Alice", 5.0).unwrap();
        let display = DisplayDonation::fresh(donation.clone());
        let json = serde_json::to_value(&display).unwrap();
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["isNew"], true);
        assert_eq!(display.id(), donation.id);
    }

    #[test]
    fn store_trait_is_object_safe() {
        fn _assert_dyn(_: &dyn DisplayStore) {}
    }
}
