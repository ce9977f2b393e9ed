// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`DisplayStore`] trait.

use async_trait::async_trait;
use tracing::{debug, info};

use pledgewall_config::model::StorageConfig;
use pledgewall_core::queue::decode_queue;
use pledgewall_core::settings::{decode_record, encode_record};
use pledgewall_core::{
    DisplayStore, Donation, DonationGoal, DonationQueue, LogoConfig, PledgeError,
    RevealOutcome, ThemeConfig, keys,
};

use crate::database::Database;
use crate::queries::kv;

/// Shared store backed by one SQLite file.
///
/// Every process (admin commands and each display) opens its own
/// `SqliteStore` on the same file; queue read-modify-writes are serialized
/// by SQLite's write lock.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub async fn open(config: &StorageConfig) -> Result<Self, PledgeError> {
        Ok(Self::new(Database::open(config).await?))
    }

    /// Private in-memory store, for tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, PledgeError> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoints the WAL before the process exits.
    pub async fn close(&self) -> Result<(), PledgeError> {
        self.db.checkpoint().await
    }

    async fn load<T: serde::de::DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<Option<T>, PledgeError> {
        kv::get(&self.db, key)
            .await?
            .map(|raw| decode_record(key, &raw))
            .transpose()
    }

    async fn save<T: serde::Serialize>(&self, key: &'static str, value: &T) -> Result<(), PledgeError> {
        kv::put(&self.db, key, encode_record(key, value)?).await
    }

    /// Read-modify-write of an existing queue. Absent queues are left absent.
    async fn modify_queue<F>(&self, mutate: F) -> Result<Option<DonationQueue>, PledgeError>
    where
        F: FnOnce(&mut DonationQueue) + Send + 'static,
    {
        kv::update(&self.db, keys::QUEUE, move |raw| {
            let Some(raw) = raw else {
                return Ok((None, None));
            };
            let mut queue = decode_queue(&raw)?;
            mutate(&mut queue);
            let encoded = encode_record(keys::QUEUE, &queue)?;
            Ok((Some(encoded), Some(queue)))
        })
        .await
    }
}

#[async_trait]
impl DisplayStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load_queue(&self) -> Result<Option<DonationQueue>, PledgeError> {
        kv::get(&self.db, keys::QUEUE)
            .await?
            .map(|raw| decode_queue(&raw))
            .transpose()
    }

    async fn save_queue(&self, queue: &DonationQueue) -> Result<(), PledgeError> {
        self.save(keys::QUEUE, queue).await?;
        debug!(
            total = queue.len(),
            current_index = queue.current_index,
            is_active = queue.is_active,
            "queue saved"
        );
        Ok(())
    }

    async fn append_donations(&self, donations: &[Donation]) -> Result<DonationQueue, PledgeError> {
        let added = donations.to_vec();
        let count = added.len();
        let queue = kv::update(&self.db, keys::QUEUE, move |raw| {
            let mut queue = match raw {
                Some(raw) => decode_queue(&raw)?,
                None => DonationQueue::empty(),
            };
            queue.append(added);
            let encoded = encode_record(keys::QUEUE, &queue)?;
            Ok((Some(encoded), queue))
        })
        .await?;
        info!(added = count, total = queue.len(), "donations appended");
        Ok(queue)
    }

    async fn set_active(&self, active: bool) -> Result<Option<DonationQueue>, PledgeError> {
        let queue = self.modify_queue(move |q| q.is_active = active).await?;
        if let Some(q) = &queue {
            info!(is_active = q.is_active, "queue activity set");
        }
        Ok(queue)
    }

    async fn toggle_active(&self) -> Result<Option<DonationQueue>, PledgeError> {
        let queue = self.modify_queue(|q| q.is_active = !q.is_active).await?;
        if let Some(q) = &queue {
            info!(is_active = q.is_active, "queue activity toggled");
        }
        Ok(queue)
    }

    async fn reveal_at(&self, index: usize) -> Result<RevealOutcome, PledgeError> {
        kv::update(&self.db, keys::QUEUE, move |raw| {
            let Some(raw) = raw else {
                return Ok((None, RevealOutcome::Missing));
            };
            let mut queue = decode_queue(&raw)?;
            let outcome = queue.reveal_at(index);
            let write = if outcome.is_write() {
                Some(encode_record(keys::QUEUE, &queue)?)
            } else {
                None
            };
            Ok((write, outcome))
        })
        .await
    }

    async fn load_goal(&self) -> Result<Option<DonationGoal>, PledgeError> {
        self.load(keys::GOAL).await
    }

    async fn save_goal(&self, goal: &DonationGoal) -> Result<(), PledgeError> {
        self.save(keys::GOAL, goal).await
    }

    async fn load_logo(&self) -> Result<Option<LogoConfig>, PledgeError> {
        self.load(keys::LOGO).await
    }

    async fn save_logo(&self, logo: &LogoConfig) -> Result<(), PledgeError> {
        self.save(keys::LOGO, logo).await
    }

    async fn remove_logo(&self) -> Result<(), PledgeError> {
        kv::remove(&self.db, keys::LOGO).await?;
        Ok(())
    }

    async fn load_theme(&self) -> Result<Option<ThemeConfig>, PledgeError> {
        self.load(keys::THEME).await
    }

    async fn save_theme(&self, theme: &ThemeConfig) -> Result<(), PledgeError> {
        self.save(keys::THEME, theme).await
    }

    async fn clear_all(&self) -> Result<(), PledgeError> {
        let removed = kv::clear(&self.db).await?;
        info!(removed, "store cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donations(amounts: &[f64]) -> Vec<Donation> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| Donation::new(format!("donor-{i}"), *a).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn append_creates_inactive_queue() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let queue = store.append_donations(&donations(&[10.0, 25.0])).await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current_index, 0);
        assert!(!queue.is_active);
        assert_eq!(store.load_queue().await.unwrap(), Some(queue));
    }

    #[tokio::test]
    async fn append_keeps_cursor_and_flag() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.append_donations(&donations(&[1.0])).await.unwrap();
        store.set_active(true).await.unwrap();
        store.reveal_at(0).await.unwrap();
        store.set_active(true).await.unwrap();

        let queue = store.append_donations(&donations(&[2.0])).await.unwrap();
        assert_eq!(queue.current_index, 1);
        assert!(queue.is_active);
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn activity_on_missing_queue_is_none() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert_eq!(store.set_active(true).await.unwrap(), None);
        assert_eq!(store.toggle_active().await.unwrap(), None);
        assert_eq!(store.load_queue().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reveal_at_advances_once_and_deactivates_at_end() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.append_donations(&donations(&[10.0, 25.0])).await.unwrap();
        store.toggle_active().await.unwrap();

        assert!(matches!(
            store.reveal_at(0).await.unwrap(),
            RevealOutcome::Revealed { index: 0, .. }
        ));
        assert!(matches!(
            store.reveal_at(0).await.unwrap(),
            RevealOutcome::Stale { .. }
        ));
        let last = store.reveal_at(1).await.unwrap();
        assert!(matches!(last, RevealOutcome::Revealed { index: 1, .. }));
        assert!(!last.queue().unwrap().is_active);

        let stored = store.load_queue().await.unwrap().unwrap();
        assert_eq!(stored.current_index, 2);
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn reveal_at_on_missing_queue() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert_eq!(store.reveal_at(0).await.unwrap(), RevealOutcome::Missing);
    }

    #[tokio::test]
    async fn corrupt_queue_is_an_error_and_not_overwritten() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        kv::put(store.database(), keys::QUEUE, "{not json".into())
            .await
            .unwrap();

        assert!(store.load_queue().await.unwrap_err().is_corrupt_record());
        assert!(store.append_donations(&donations(&[1.0])).await.unwrap_err().is_corrupt_record());
        assert!(store.set_active(true).await.unwrap_err().is_corrupt_record());

        let raw = kv::get(store.database(), keys::QUEUE).await.unwrap();
        assert_eq!(raw.as_deref(), Some("{not json"));

        store.reset_queue().await.unwrap();
        assert_eq!(store.load_queue().await.unwrap(), Some(DonationQueue::empty()));
    }

    #[tokio::test]
    async fn settings_round_trip_and_clear() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let goal = DonationGoal::with_target(500.0).unwrap();
        let theme = ThemeConfig::preset("Ocean Blue").unwrap();
        let logo = LogoConfig {
            url: "https://example.org/logo.png".into(),
            width: 300,
            height: 150,
        };

        store.save_goal(&goal).await.unwrap();
        store.save_theme(&theme).await.unwrap();
        store.save_logo(&logo).await.unwrap();
        assert_eq!(store.load_goal().await.unwrap(), Some(goal));
        assert_eq!(store.load_theme().await.unwrap(), Some(theme));
        assert_eq!(store.load_logo().await.unwrap(), Some(logo));

        store.remove_logo().await.unwrap();
        assert_eq!(store.load_logo().await.unwrap(), None);

        store.append_donations(&donations(&[1.0])).await.unwrap();
        store.clear_all().await.unwrap();
        assert_eq!(store.load_queue().await.unwrap(), None);
        assert_eq!(store.load_goal().await.unwrap(), None);
        assert_eq!(store.load_theme().await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_reports_backend_name() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert_eq!(store.name(), "sqlite");
    }
}
