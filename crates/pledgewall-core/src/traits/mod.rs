// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the storage seam.
//!
//! Traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod store;

pub use store::DisplayStore;
