//! The view model: fetched records plus the current search term.
//!
//! The visible list is derived on demand from those two values, so there is
//! no cached projection to keep in sync.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::RecordStore;

/// Owns the record window shown to the user and the search term applied to it.
#[derive(Debug)]
pub struct ViewModel<S> {
    store: S,
    window: usize,
    records: Vec<Record>,
    search_term: String,
}

impl<S: RecordStore> ViewModel<S> {
    /// Create an empty view over `store` showing at most `window` records.
    #[must_use]
    pub fn new(store: S, window: usize) -> Self {
        Self {
            store,
            window,
            records: Vec::new(),
            search_term: String::new(),
        }
    }

    /// Load the initial record window. Call once after construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the fetch fails; the record list
    /// is left empty in that case.
    pub async fn initialize(&mut self) -> Result<()> {
        debug!("Initializing view with a window of {}", self.window);
        self.refresh().await
    }

    /// Reload the record window from the store, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the fetch fails; the record list
    /// is cleared in that case.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.store.fetch_recent(self.window).await {
            Ok(mut records) => {
                records.reverse();
                self.records = records;
                Ok(())
            }
            Err(err) => {
                warn!("Could not load records: {err}");
                self.records.clear();
                Err(err)
            }
        }
    }

    /// Set the search term. Stored verbatim; case is ignored when filtering.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// The current search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// All fetched records, newest first.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records whose text contains the search term, ignoring case, newest first.
    #[must_use]
    pub fn visible_records(&self) -> Vec<&Record> {
        let needle = self.search_term.to_lowercase();
        self.records.iter().filter(|r| r.matches(&needle)).collect()
    }

    /// The visible record at a 1-based row number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowOutOfRange`] if no visible record has that row.
    pub fn visible_row(&self, row: usize) -> Result<&Record> {
        let visible = self.visible_records();
        row.checked_sub(1)
            .and_then(|index| visible.get(index).copied())
            .ok_or(Error::RowOutOfRange {
                row,
                visible: visible.len(),
            })
    }

    /// Append `text` to the store.
    ///
    /// Empty text is ignored and yields `Ok(None)`. The record window is not
    /// changed; call [`ViewModel::refresh`] to see the new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the write fails.
    pub async fn submit(&self, text: &str) -> Result<Option<Record>> {
        match self.store.append(text).await {
            Ok(record) => Ok(Some(record)),
            Err(Error::EmptyInput) => {
                debug!("Ignoring empty submission");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Maximum number of records loaded.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use crate::record::now_millis;
    use crate::store::MemoryStore;

    fn record(id: &str, text: &str, created_at: i64) -> Record {
        Record {
            id: id.to_string(),
            text: text.to_string(),
            created_at,
        }
    }

    fn scenario_store() -> MemoryStore {
        MemoryStore::with_records(vec![
            record("A", "alpha", 100),
            record("B", "beta", 200),
            record("C", "Alpha2", 300),
        ])
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_initialize_orders_newest_first() {
        let mut view = ViewModel::new(scenario_store(), 10);
        view.initialize().await.unwrap();

        let all: Vec<&Record> = view.records().iter().collect();
        assert_eq!(ids(&all), vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_ordered() {
        let mut view = ViewModel::new(scenario_store(), 10);
        view.initialize().await.unwrap();

        view.set_search_term("alpha");
        assert_eq!(ids(&view.visible_records()), vec!["C", "A"]);

        view.set_search_term("ALPHA");
        assert_eq!(ids(&view.visible_records()), vec!["C", "A"]);
        assert_eq!(view.search_term(), "ALPHA");
    }

    #[tokio::test]
    async fn test_empty_search_shows_everything() {
        let mut view = ViewModel::new(scenario_store(), 10);
        view.initialize().await.unwrap();

        view.set_search_term("");
        let visible: Vec<Record> = view.visible_records().into_iter().cloned().collect();
        assert_eq!(visible, view.records());
    }

    #[tokio::test]
    async fn test_visible_partition_matches_term() {
        let store = MemoryStore::with_records(vec![
            record("1", "Hello World", 1),
            record("2", "hello", 2),
            record("3", "yellow", 3),
            record("4", "HELLO again", 4),
            record("5", "goodbye", 5),
        ]);
        let mut view = ViewModel::new(store, 10);
        view.initialize().await.unwrap();

        for term in ["hello", "ELL", "o", "xyz", "bye"] {
            view.set_search_term(term);
            let needle = term.to_lowercase();
            let visible = view.visible_records();
            for r in view.records() {
                let shown = visible.iter().any(|v| v.id == r.id);
                assert_eq!(shown, r.text.to_lowercase().contains(&needle), "term {term}");
            }
        }
    }

    #[tokio::test]
    async fn test_window_limits_records() {
        let store = MemoryStore::with_records((0..15).map(|i| record(&format!("k{i:02}"), "x", i)));
        let mut view = ViewModel::new(store, 10);
        view.initialize().await.unwrap();

        assert_eq!(view.records().len(), 10);
        assert_eq!(view.records()[0].id, "k14");
        assert_eq!(view.records()[9].id, "k05");
    }

    #[tokio::test]
    async fn test_empty_store_initializes_empty() {
        let mut view = ViewModel::new(MemoryStore::new(), 10);
        assert!(view.initialize().await.is_ok());
        assert!(view.visible_records().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_list_empty() {
        init_test_logging();
        let mut view = ViewModel::new(scenario_store(), 10);
        view.initialize().await.unwrap();
        assert_eq!(view.records().len(), 3);

        view.store().set_offline(true);
        let err = view.refresh().await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(view.records().is_empty());
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let mut view = ViewModel::new(MemoryStore::new(), 10);
        view.initialize().await.unwrap();

        let before = now_millis();
        let stored = view.submit("hello").await.unwrap().unwrap();
        assert!(stored.created_at >= before);

        // The window only changes on refresh
        assert!(view.records().is_empty());
        view.refresh().await.unwrap();
        assert_eq!(view.records(), &[stored]);
    }

    #[tokio::test]
    async fn test_submit_empty_is_silent_noop() {
        let view = ViewModel::new(MemoryStore::new(), 10);
        assert_eq!(view.submit("").await.unwrap(), None);
        assert!(view.store().is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_is_reported() {
        let view = ViewModel::new(MemoryStore::new(), 10);
        view.store().set_offline(true);
        let err = view.submit("hello").await.unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn test_visible_row() {
        let mut view = ViewModel::new(scenario_store(), 10);
        view.initialize().await.unwrap();
        view.set_search_term("alpha");

        assert_eq!(view.visible_row(1).unwrap().id, "C");
        assert_eq!(view.visible_row(2).unwrap().id, "A");
        assert!(matches!(
            view.visible_row(3),
            Err(Error::RowOutOfRange { row: 3, visible: 2 })
        ));
        assert!(matches!(view.visible_row(0), Err(Error::RowOutOfRange { .. })));
    }
}
