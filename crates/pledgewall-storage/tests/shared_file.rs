// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two store handles on one SQLite file, standing in for two processes.

use std::collections::HashSet;

use pledgewall_config::model::StorageConfig;
use pledgewall_core::{DisplayStore, Donation, RevealOutcome};
use pledgewall_storage::SqliteStore;

async fn open_pair(dir: &tempfile::TempDir) -> (SqliteStore, SqliteStore) {
    let config = StorageConfig {
        database_path: dir.path().join("wall.db").to_string_lossy().into_owned(),
        ..StorageConfig::default()
    };
    let first = SqliteStore::open(&config).await.unwrap();
    let second = SqliteStore::open(&config).await.unwrap();
    (first, second)
}

fn donations(n: usize) -> Vec<Donation> {
    (0..n)
        .map(|i| Donation::new(format!("donor-{i}"), (i + 1) as f64).unwrap())
        .collect()
}

/// Reveals whatever the cursor points at until the queue stops.
async fn reveal_loop(store: SqliteStore) -> Vec<usize> {
    let mut revealed = Vec::new();
    loop {
        let Some(queue) = store.load_queue().await.unwrap() else {
            break;
        };
        match store.reveal_at(queue.current_index).await.unwrap() {
            RevealOutcome::Revealed { index, .. } => revealed.push(index),
            RevealOutcome::Stale { .. } => continue,
            RevealOutcome::Inactive { .. }
            | RevealOutcome::Exhausted { .. }
            | RevealOutcome::Missing => break,
        }
    }
    revealed
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_revealers_never_duplicate_or_skip() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = open_pair(&dir).await;
    a.append_donations(&donations(25)).await.unwrap();
    a.set_active(true).await.unwrap();

    let (left, right) = tokio::join!(
        tokio::spawn(reveal_loop(a.clone())),
        tokio::spawn(reveal_loop(b.clone()))
    );
    let left = left.unwrap();
    let right = right.unwrap();

    let all: HashSet<usize> = left.iter().chain(right.iter()).copied().collect();
    assert_eq!(left.len() + right.len(), 25, "an index was revealed twice");
    assert_eq!(all, (0..25).collect::<HashSet<_>>());

    let queue = b.load_queue().await.unwrap().unwrap();
    assert_eq!(queue.current_index, 25);
    assert!(!queue.is_active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn appends_during_playback_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, display) = open_pair(&dir).await;
    admin.append_donations(&donations(5)).await.unwrap();
    admin.set_active(true).await.unwrap();

    let appender = tokio::spawn({
        let admin = admin.clone();
        async move {
            for _ in 0..10 {
                admin.append_donations(&donations(1)).await.unwrap();
            }
        }
    });
    let revealer = tokio::spawn({
        let display = display.clone();
        async move {
            for _ in 0..5 {
                let queue = display.load_queue().await.unwrap().unwrap();
                display.reveal_at(queue.current_index).await.unwrap();
            }
        }
    });
    appender.await.unwrap();
    revealer.await.unwrap();

    let queue = display.load_queue().await.unwrap().unwrap();
    assert_eq!(queue.len(), 15);
    assert!(queue.current_index <= 5);
}

#[tokio::test]
async fn writes_are_visible_to_the_other_handle() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, display) = open_pair(&dir).await;

    admin.append_donations(&donations(2)).await.unwrap();
    assert_eq!(display.load_queue().await.unwrap().unwrap().len(), 2);

    admin.reset_queue().await.unwrap();
    let queue = display.load_queue().await.unwrap().unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.current_index, 0);
    assert!(!queue.is_active);

    admin.close().await.unwrap();
    display.close().await.unwrap();
}
