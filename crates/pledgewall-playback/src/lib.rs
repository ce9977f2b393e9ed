// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Donation playback for Pledgewall displays.
//!
//! - [`scheduler`] - when to reveal the next donation, catch-up and rebasing
//! - [`goal`] - running total against the target
//! - [`ticker`] and [`wall`] - the two projections
//! - [`runtime`] - the per-display event loop and its snapshots
//! - [`service`] - spawning a watcher and runtime together

pub mod goal;
pub mod projection;
pub mod runtime;
pub mod scheduler;
pub mod service;
pub mod ticker;
pub mod wall;

pub use goal::{GoalProgress, GoalTracker};
pub use projection::{Projection, ProjectionSettings, ProjectionView};
pub use runtime::{DisplayRuntime, DisplaySnapshot, RuntimeSettings};
pub use scheduler::{PlaybackEvent, PlaybackScheduler, PlaybackStatus, RevealSource, StopReason};
pub use service::{DisplayHandle, spawn_display};
