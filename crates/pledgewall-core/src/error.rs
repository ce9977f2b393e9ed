// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Pledgewall.

use thiserror::Error;

/// The primary error type used across store operations, playback and admin commands.
#[derive(Debug, Error)]
pub enum PledgeError {
    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted record exists but does not decode as the expected JSON shape.
    #[error("corrupt record under key `{key}`: {source}")]
    CorruptRecord {
        key: String,
        source: serde_json::Error,
    },

    /// A record could not be encoded for persistence.
    #[error("failed to encode record for key `{key}`: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },

    /// A donation import batch was rejected.
    #[error("import failed: {message}")]
    Import {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Admin input rejected before touching the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation required a record that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PledgeError {
    /// Wraps any storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PledgeError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns `true` for errors caused by an undecodable persisted record.
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, PledgeError::CorruptRecord { .. })
    }
}
