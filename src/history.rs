//! Bounded, newest-first history of completed analyses over a pluggable
//! string-keyed store.
//!
//! Reads deliberately degrade instead of failing: a missing or corrupted
//! stored value yields an empty list, because history retrieval must never
//! block the rest of the system.

use crate::types::AnalysisResult;
use std::collections::HashMap;
use tracing::warn;

/// Storage key for the serialized history array.
pub const HISTORY_KEY: &str = "nutrition_analysis_history";

/// The history never holds more than this many entries.
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// A string-keyed store the history persists into.
///
/// Injected as an interface so persistence is swappable and testable; the
/// in-memory implementation below is the default. Read-modify-write here is
/// synchronous — callers with concurrent writers must serialize externally.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory [`KeyValueStore`] over a `HashMap`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Newest-first append log of [`AnalysisResult`]s, capped at
/// [`MAX_HISTORY_ENTRIES`].
#[derive(Debug, Clone)]
pub struct AnalysisHistory<S> {
    store: S,
}

impl<S: KeyValueStore> AnalysisHistory<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Prepends a result and truncates to the most recent
    /// [`MAX_HISTORY_ENTRIES`] entries.
    pub fn append(&mut self, result: AnalysisResult) {
        let mut entries = self.list();
        entries.insert(0, result);
        entries.truncate(MAX_HISTORY_ENTRIES);
        match serde_json::to_string(&entries) {
            Ok(serialized) => self.store.set(HISTORY_KEY, serialized),
            Err(e) => warn!("failed to serialize analysis history: {e}"),
        }
    }

    /// Returns the stored sequence, newest first.
    ///
    /// A missing or unparseable stored value yields an empty list.
    #[must_use]
    pub fn list(&self) -> Vec<AnalysisResult> {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("stored analysis history is unparseable, returning empty: {e}");
                Vec::new()
            }
        }
    }

    /// Removes the stored sequence entirely.
    pub fn clear(&mut self) {
        self.store.remove(HISTORY_KEY);
    }

    /// Consumes the history, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}
