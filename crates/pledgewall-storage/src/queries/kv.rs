// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw string operations on the shared key-value table.

use pledgewall_core::PledgeError;
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use crate::database::{Database, map_tr_err};

const UPSERT: &str = "INSERT INTO kv (key, value, updated_at) \
     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// Reads the raw value stored under `key`.
pub async fn get(db: &Database, key: &str) -> Result<Option<String>, PledgeError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Writes `value` under `key`, replacing any previous value.
pub async fn put(db: &Database, key: &str, value: String) -> Result<(), PledgeError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(UPSERT, params![key, value])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes `key`. Returns whether a row was removed.
pub async fn remove(db: &Database, key: &str) -> Result<bool, PledgeError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes every key. Returns the number of rows removed.
pub async fn clear(db: &Database) -> Result<usize, PledgeError> {
    db.connection()
        .call(|conn| conn.execute("DELETE FROM kv", []))
        .await
        .map_err(map_tr_err)
}

/// Atomically reads, transforms and writes back the value under `key`.
///
/// Runs inside a `BEGIN IMMEDIATE` transaction, so the write lock is taken
/// before the read and no other connection (in any process) can interleave
/// a write. `apply` receives the current raw value and returns the value to
/// store (`None` leaves the row untouched) plus a result for the caller. An
/// error from `apply` rolls the transaction back.
pub async fn update<F, R>(db: &Database, key: &str, apply: F) -> Result<R, PledgeError>
where
    F: FnOnce(Option<String>) -> Result<(Option<String>, R), PledgeError> + Send + 'static,
    R: Send + 'static,
{
    let key = key.to_string();
    db.connection()
        .call(
            move |conn| -> Result<Result<R, PledgeError>, rusqlite::Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current: Option<String> = tx
                    .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                        row.get(0)
                    })
                    .optional()?;

                let (next, result) = match apply(current) {
                    Ok(applied) => applied,
                    // Dropping the transaction rolls it back.
                    Err(e) => return Ok(Err(e)),
                };

                if let Some(value) = next {
                    tx.execute(UPSERT, params![key, value])?;
                }
                tx.commit()?;
                Ok(Ok(result))
            },
        )
        .await
        .map_err(map_tr_err)?
}
