// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events describing changes observed in the shared store.

use pledgewall_core::{DonationGoal, DonationQueue, LogoConfig, ThemeConfig};

/// A record in the shared store changed (or could not be read).
///
/// `None` payloads mean the record is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    QueueChanged(Option<DonationQueue>),
    GoalChanged(Option<DonationGoal>),
    LogoChanged(Option<LogoConfig>),
    ThemeChanged(Option<ThemeConfig>),
    /// A record failed to load. The last good value stays in effect.
    ReadFailed { key: String, message: String },
}

impl StoreEvent {
    /// Store key the event concerns.
    pub fn key(&self) -> &str {
        use pledgewall_core::keys;
        match self {
            StoreEvent::QueueChanged(_) => keys::QUEUE,
            StoreEvent::GoalChanged(_) => keys::GOAL,
            StoreEvent::LogoChanged(_) => keys::LOGO,
            StoreEvent::ThemeChanged(_) => keys::THEME,
            StoreEvent::ReadFailed { key, .. } => key,
        }
    }
}
