// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! Every statement for one process goes through tokio-rusqlite's background
//! thread. Other processes share the same file; SQLite's locking (with the
//! configured busy timeout) arbitrates between them.

use std::path::Path;
use std::time::Duration;

use pledgewall_config::model::StorageConfig;
use pledgewall_core::PledgeError;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Map a tokio-rusqlite error into the storage variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> PledgeError {
    PledgeError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the shared SQLite file.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
    path: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Opens (creating if needed) the database file, applies PRAGMAs and runs
    /// pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, PledgeError> {
        let path = config.database_path.clone();
        if let Some(parent) = Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(PledgeError::storage)?;
        }

        let conn = Connection::open(&path).await.map_err(PledgeError::storage)?;
        let db = Self { conn, path };
        db.prepare(config.wal_mode, Duration::from_millis(config.busy_timeout_ms))
            .await?;
        info!(path = %db.path, wal = config.wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, PledgeError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(PledgeError::storage)?;
        let db = Self {
            conn,
            path: ":memory:".to_string(),
        };
        db.prepare(false, Duration::from_millis(0)).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool, busy_timeout: Duration) -> Result<(), PledgeError> {
        self.conn
            .call(
                move |conn| -> Result<Result<(), PledgeError>, rusqlite::Error> {
                    conn.busy_timeout(busy_timeout)?;
                    if wal_mode {
                        let mode: String = conn.pragma_update_and_check(
                            None,
                            "journal_mode",
                            "WAL",
                            |row| row.get(0),
                        )?;
                        debug!(journal_mode = %mode, "journal mode set");
                    }
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                    Ok(crate::migrations::run_migrations(conn))
                },
            )
            .await
            .map_err(map_tr_err)?
    }

    /// Returns the tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Truncates the WAL file. Called before a process exits.
    pub async fn checkpoint(&self) -> Result<(), PledgeError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
