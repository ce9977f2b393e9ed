// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Pledgewall.
//!
//! The shared store is a single `kv` table in a WAL-mode SQLite file that
//! the admin and every display open independently. Queue read-modify-writes
//! run in `IMMEDIATE` transactions. [`StoreWatcher`] turns the store into a
//! stream of change events for displays.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod watcher;

pub use adapter::SqliteStore;
pub use database::Database;
pub use watcher::StoreWatcher;
