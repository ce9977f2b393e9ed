// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pledgewall display`: runs one display instance with a text renderer.

use std::sync::Arc;

use pledgewall_config::PledgewallConfig;
use pledgewall_core::{DisplayMode, PlaybackRole, PledgeError};
use pledgewall_playback::{DisplaySnapshot, ProjectionView, RuntimeSettings, spawn_display};
use pledgewall_storage::SqliteStore;
use tracing::info;

use crate::{format, shutdown};

/// Runs until SIGINT/SIGTERM, printing a line per snapshot change.
pub async fn run_display(
    config: &PledgewallConfig,
    mode: DisplayMode,
    role: Option<PlaybackRole>,
    json: bool,
) -> Result<(), PledgeError> {
    let store = SqliteStore::open(&config.storage).await?;
    let mut settings = RuntimeSettings::from_config(config, mode);
    if let Some(role) = role {
        settings = settings.with_role(role);
    }

    let cancel = shutdown::install_signal_handler();
    let handle = spawn_display(Arc::new(store.clone()), settings, cancel.clone());
    let mut snapshots = handle.snapshots();
    info!(%mode, role = %settings.role, database = %config.storage.database_path, "display running");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if json {
                    let line = serde_json::to_string(&snapshot)
                        .map_err(|e| PledgeError::Internal(format!("failed to render snapshot: {e}")))?;
                    println!("{line}");
                } else {
                    println!("{}", render(&snapshot));
                }
            }
        }
    }

    handle.join().await;
    store.close().await?;
    info!("display stopped");
    Ok(())
}

/// One-line text rendering of a snapshot.
pub fn render(snapshot: &DisplaySnapshot) -> String {
    let mut line = format!(
        "[{} {} {}] {} raised",
        snapshot.mode,
        snapshot.role,
        snapshot.playback,
        format::amount(snapshot.goal.current)
    );
    if snapshot.goal.target > 0.0 {
        line.push_str(&format!(
            " of {} ({:.1}%)",
            format::amount(snapshot.goal.target),
            snapshot.goal.progress_percent
        ));
    }
    if let Some(queue) = snapshot.queue {
        line.push_str(&format!(
            " | queue {}/{}",
            queue.processed_donations, queue.total_donations
        ));
    }

    match &snapshot.projection {
        ProjectionView::Ticker { bubbles } => {
            let shown: Vec<String> = bubbles
                .iter()
                .map(|b| entry(&b.donation.donation.name, b.donation.donation.amount, b.donation.is_new))
                .collect();
            if !shown.is_empty() {
                line.push_str(&format!(" | {}", shown.join(", ")));
            }
        }
        ProjectionView::Live { banner, grid } => {
            if let Some(latest) = banner {
                line.push_str(&format!(
                    " | LATEST {}",
                    entry(&latest.donation.name, latest.donation.amount, false)
                ));
            }
            if !grid.is_empty() {
                let shown: Vec<String> = grid
                    .iter()
                    .map(|d| entry(&d.donation.name, d.donation.amount, d.is_new))
                    .collect();
                line.push_str(&format!(" | {}", shown.join(", ")));
            }
        }
    }

    if let Some(message) = &snapshot.status_message {
        line.push_str(&format!(" | ! {message}"));
    }
    line
}

fn entry(name: &str, amount: f64, is_new: bool) -> String {
    let marker = if is_new { "*" } else { "" };
    format!("{marker}{name} {}", format::amount(amount))
}
