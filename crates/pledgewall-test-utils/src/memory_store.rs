// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`DisplayStore`] for deterministic tests.
//!
//! Records are kept as raw JSON strings under the same keys the SQLite
//! store uses, so tests can plant corrupt records with [`MemoryStore::put_raw`].
//! A single mutex makes every read-modify-write atomic.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use pledgewall_core::queue::decode_queue;
use pledgewall_core::settings::{decode_record, encode_record};
use pledgewall_core::{
    DisplayStore, Donation, DonationGoal, DonationQueue, LogoConfig, PledgeError,
    RevealOutcome, ThemeConfig, keys,
};

/// A shared in-memory store. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a queue.
    pub async fn with_queue(queue: &DonationQueue) -> Self {
        let store = Self::new();
        store
            .save_queue(queue)
            .await
            .expect("queue fixtures always encode");
        store
    }

    /// Writes a raw value, bypassing encoding.
    pub async fn put_raw(&self, key: &str, value: &str) {
        self.records
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.records.lock().await.get(key).cloned()
    }

    /// Number of writes made through the [`DisplayStore`] API.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PledgeError> {
        let records = self.records.lock().await;
        records.get(key).map(|raw| decode_record(key, raw)).transpose()
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PledgeError> {
        let encoded = encode_record(key, value)?;
        self.records.lock().await.insert(key.to_string(), encoded);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn modify_queue(
        &self,
        mutate: impl FnOnce(&mut DonationQueue),
    ) -> Result<Option<DonationQueue>, PledgeError> {
        let mut records = self.records.lock().await;
        let Some(raw) = records.get(keys::QUEUE) else {
            return Ok(None);
        };
        let mut queue = decode_queue(raw)?;
        mutate(&mut queue);
        records.insert(keys::QUEUE.to_string(), encode_record(keys::QUEUE, &queue)?);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(queue))
    }
}

#[async_trait]
impl DisplayStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_queue(&self) -> Result<Option<DonationQueue>, PledgeError> {
        let records = self.records.lock().await;
        records.get(keys::QUEUE).map(|raw| decode_queue(raw)).transpose()
    }

    async fn save_queue(&self, queue: &DonationQueue) -> Result<(), PledgeError> {
        self.save(keys::QUEUE, queue).await
    }

    async fn append_donations(&self, donations: &[Donation]) -> Result<DonationQueue, PledgeError> {
        let mut records = self.records.lock().await;
        let mut queue = match records.get(keys::QUEUE) {
            Some(raw) => decode_queue(raw)?,
            None => DonationQueue::empty(),
        };
        queue.append(donations.iter().cloned());
        records.insert(keys::QUEUE.to_string(), encode_record(keys::QUEUE, &queue)?);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(queue)
    }

    async fn set_active(&self, active: bool) -> Result<Option<DonationQueue>, PledgeError> {
        self.modify_queue(|q| q.is_active = active).await
    }

    async fn toggle_active(&self) -> Result<Option<DonationQueue>, PledgeError> {
        self.modify_queue(|q| q.is_active = !q.is_active).await
    }

    async fn reveal_at(&self, index: usize) -> Result<RevealOutcome, PledgeError> {
        let mut records = self.records.lock().await;
        let Some(raw) = records.get(keys::QUEUE) else {
            return Ok(RevealOutcome::Missing);
        };
        let mut queue = decode_queue(raw)?;
        let outcome = queue.reveal_at(index);
        if outcome.is_write() {
            records.insert(keys::QUEUE.to_string(), encode_record(keys::QUEUE, &queue)?);
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(outcome)
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
        self.records.lock().await.remove(keys::LOGO);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_theme(&self) -> Result<Option<ThemeConfig>, PledgeError> {
        self.load(keys::THEME).await
    }

    async fn save_theme(&self, theme: &ThemeConfig) -> Result<(), PledgeError> {
        self.save(keys::THEME, theme).await
    }

    async fn clear_all(&self) -> Result<(), PledgeError> {
        self.records.lock().await.clear();
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("memory store cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn behaves_like_the_shared_store() {
        let store = MemoryStore::new();
        assert_eq!(store.toggle_active().await.unwrap(), None);

        store
            .append_donations(&fixtures::donations(&[10.0, 25.0]))
            .await
            .unwrap();
        store.set_active(true).await.unwrap();
        assert!(matches!(
            store.reveal_at(0).await.unwrap(),
            RevealOutcome::Revealed { index: 0, .. }
        ));
        assert!(matches!(
            store.reveal_at(0).await.unwrap(),
            RevealOutcome::Stale { .. }
        ));
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn corrupt_records_surface_as_errors() {
        let store = MemoryStore::new();
        store.put_raw(keys::GOAL, "{\"target\":").await;
        assert!(store.load_goal().await.unwrap_err().is_corrupt_record());
        assert_eq!(store.raw(keys::GOAL).await.as_deref(), Some("{\"target\":"));
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = MemoryStore::with_queue(&fixtures::active_queue(&[1.0])).await;
        let other = store.clone();
        other.reset_queue().await.unwrap();
        assert!(store.load_queue().await.unwrap().unwrap().is_empty());
    }
}
