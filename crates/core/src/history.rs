use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::{
    error::StorageError,
    store::KeyValueStore,
    types::{AnalysisKind, AnalysisRequest, AnalysisResult, HistoryItem},
};

pub const HISTORY_KEY: &str = "analysisHistory";
pub const HISTORY_CAPACITY: usize = 10;

impl HistoryItem {
    /// Record of a completed analysis. The id is `"{timestamp}-{url}"`, unique
    /// in practice only: two kinds requested for the same URL within the same
    /// millisecond share an id.
    pub fn new(request: &AnalysisRequest, result: &AnalysisResult, at: DateTime<Utc>) -> Self {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id: format!("{}-{}", timestamp, request.url),
            youtube_url: request.url.clone(),
            prompt_type: request.kind,
            result: result.text.clone(),
            token_count: result.approx_tokens,
            timestamp,
            number_of_questions: (request.kind == AnalysisKind::Quiz)
                .then(|| request.options.number_of_questions.get()),
        }
    }
}

/// Bounded, newest-first log of past analyses.
///
/// Every mutation rewrites the whole list. Two stores over the same backing
/// key do not coordinate, so concurrent writers race (last write wins); callers
/// that share storage must serialize their appends.
pub struct HistoryStore<S> {
    store: S,
    items: Vec<HistoryItem>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Load persisted history once.
    pub fn open(store: S) -> Self {
        let items = load_all(&store);
        Self { store, items }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prepend `item`, keep the newest `HISTORY_CAPACITY`, and persist.
    pub fn append(&mut self, item: HistoryItem) -> Result<(), StorageError> {
        self.items.insert(0, item);
        self.items.truncate(HISTORY_CAPACITY);
        let json = serde_json::to_string(&self.items)?;
        self.store.set_item(HISTORY_KEY, &json)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.store.remove_item(HISTORY_KEY)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Read the persisted history. Anything unreadable counts as empty history.
/// Data that is not a JSON array is discarded; entries that fail to decode
/// (e.g. an unknown `promptType`) are skipped one by one.
pub fn load_all<S: KeyValueStore>(store: &S) -> Vec<HistoryItem> {
    let raw = match store.get_item(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read history");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(entries) => entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<HistoryItem>(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable history entry");
                    None
                }
            })
            .take(HISTORY_CAPACITY)
            .collect(),
        Err(e) => {
            warn!(error = %e, "discarding corrupt history");
            if let Err(e) = store.remove_item(HISTORY_KEY) {
                warn!(error = %e, "failed to remove corrupt history");
            }
            Vec::new()
        }
    }
}
