//! Record store clients.
//!
//! A [`RecordStore`] reads the most recent records and appends new ones. The
//! production implementation talks to the Firebase Realtime Database REST API;
//! [`MemoryStore`] keeps records in process with the same ordering rules.

mod firebase;
mod memory;
pub mod push_id;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Record;

pub use firebase::{FirebaseStore, StoreConnection};
pub use memory::MemoryStore;
pub use push_id::PushIdGenerator;

/// Default collection path for text uploads.
pub const DEFAULT_COLLECTION_PATH: &str = "uploads/text";

/// Read/append access to a keyed collection of records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch up to `limit` records ordered by `created_at` ascending.
    ///
    /// An empty collection yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] if the store cannot be read.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Record>>;

    /// Persist `text` as a new record stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EmptyInput`] without writing anything when
    /// `text` is empty, or [`crate::Error::StoreUnavailable`] if the write
    /// fails.
    async fn append(&self, text: &str) -> Result<Record>;

    /// Human-readable location of the store, for status output.
    fn describe(&self) -> String;
}

/// Keep the last `limit` records of an ascending list.
///
/// Ties on `created_at` are broken by id so the order is total.
pub(crate) fn last_n_ascending(mut records: Vec<Record>, limit: usize) -> Vec<Record> {
    records.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    let skip = records.len().saturating_sub(limit);
    records.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, created_at: i64) -> Record {
        Record {
            id: id.to_string(),
            text: id.to_string(),
            created_at,
        }
    }

    #[test]
    fn test_last_n_ascending_orders_and_truncates() {
        let records = vec![record("c", 300), record("a", 100), record("b", 200)];
        let kept = last_n_ascending(records, 2);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_last_n_ascending_ties_use_id() {
        let records = vec![record("y", 100), record("x", 100)];
        let kept = last_n_ascending(records, 10);
        assert_eq!(kept[0].id, "x");
        assert_eq!(kept[1].id, "y");
    }

    #[test]
    fn test_last_n_ascending_zero_limit() {
        let records = vec![record("a", 1)];
        assert!(last_n_ascending(records, 0).is_empty());
    }
}
