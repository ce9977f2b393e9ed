// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Pledgewall.
//!
//! - [`MemoryStore`] - in-process [`DisplayStore`](pledgewall_core::DisplayStore)
//!   with raw record access and write counting
//! - [`fixtures`] - donation and queue builders

pub mod fixtures;
pub mod memory_store;

pub use memory_store::MemoryStore;
