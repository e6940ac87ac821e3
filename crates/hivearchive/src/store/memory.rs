//! In-process record store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::{last_n_ascending, PushIdGenerator, RecordStore};
use crate::error::{Error, Result};
use crate::record::{now_millis, Document, Record};

/// A record store held in memory.
///
/// Behaves like the remote store: ids are push keys, fetches are ordered by
/// `created_at`, and empty text is rejected. It can be switched offline to
/// exercise failure handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Document>>,
    ids: PushIdGenerator,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        {
            let mut documents = store.lock();
            for record in records {
                let document = record.document();
                documents.insert(record.id, document);
            }
        }
        store
    }

    /// Make every following call fail with `StoreUnavailable` (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Document>> {
        self.documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_online(&self, operation: &'static str) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable(operation, "memory store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Record>> {
        self.check_online("fetch")?;
        let records = self
            .lock()
            .iter()
            .map(|(id, document)| Record::from_document(id.clone(), document.clone()))
            .collect();
        Ok(last_n_ascending(records, limit))
    }

    async fn append(&self, text: &str) -> Result<Record> {
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        self.check_online("append")?;

        let created_at = now_millis();
        let record = Record {
            id: self.ids.next_id(created_at),
            text: text.to_string(),
            created_at,
        };
        self.lock().insert(record.id.clone(), record.document());
        debug!("Stored record {} in memory", record.id);
        Ok(record)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
