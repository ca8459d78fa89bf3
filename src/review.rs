//! Review records and the in-memory store that holds them.
//!
//! The store is loaded once from a JSON file and afterwards only mutated by
//! translation results. Readers take immutable snapshots; writers bump a
//! revision counter that subscribers can watch for changes.

use crate::error::{Result, TranslationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Highest rating a review may carry.
pub const MAX_RATING: f64 = 5.0;

/// A single cafe review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Stable identity. Generated at decode time when the file has none.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub description: String,
    pub highlights: String,
    /// Price label such as "$$"
    pub price_range: String,
    /// Rating between 0 and 5 inclusive
    pub rating: f64,
}

impl ReviewRecord {
    /// Read one translatable field.
    pub fn field(&self, field: ReviewField) -> &str {
        match field {
            ReviewField::Name => &self.name,
            ReviewField::Description => &self.description,
            ReviewField::Highlights => &self.highlights,
        }
    }

    fn field_mut(&mut self, field: ReviewField) -> &mut String {
        match field {
            ReviewField::Name => &mut self.name,
            ReviewField::Description => &mut self.description,
            ReviewField::Highlights => &mut self.highlights,
        }
    }
}

/// The textual fields a translation may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewField {
    Name,
    Description,
    Highlights,
}

impl std::fmt::Display for ReviewField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReviewField::Name => "name",
            ReviewField::Description => "description",
            ReviewField::Highlights => "highlights",
        };
        f.write_str(name)
    }
}

/// Decode a JSON array of reviews.
///
/// Decoding is all-or-nothing: a malformed document, a missing or mistyped
/// field, a rating outside `0..=5` or a repeated id rejects the whole input.
pub fn decode_reviews(bytes: &[u8]) -> Result<Vec<ReviewRecord>> {
    let reviews: Vec<ReviewRecord> = serde_json::from_slice(bytes)?;

    let mut seen = HashSet::with_capacity(reviews.len());
    for (index, review) in reviews.iter().enumerate() {
        if !(0.0..=MAX_RATING).contains(&review.rating) {
            return Err(TranslationError::Decode(format!(
                "review {} ({}) has rating {} outside 0..={}",
                index, review.name, review.rating, MAX_RATING
            )));
        }
        if !seen.insert(review.id) {
            return Err(TranslationError::Decode(format!(
                "review {} repeats id {}",
                index, review.id
            )));
        }
    }

    Ok(reviews)
}

/// Ordered, shared collection of reviews.
///
/// Array position is the address used by translation correlation. Each field
/// write happens under the write lock, so readers never observe a torn field.
#[derive(Debug)]
pub struct ReviewStore {
    records: RwLock<Vec<ReviewRecord>>,
    revision: watch::Sender<u64>,
}

impl ReviewStore {
    /// Build a store from already-decoded records.
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            records: RwLock::new(records),
            revision,
        }
    }

    /// Decode a store from raw JSON bytes.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let records = decode_reviews(bytes)?;
        debug!("Decoded {} reviews", records.len());
        Ok(Self::new(records))
    }

    /// Read and decode a review file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let store = Self::load(&bytes)?;
        info!("Loaded {} reviews from {}", store.len(), path.display());
        Ok(store)
    }

    /// Like [`load_from_path`](Self::load_from_path), but an unreadable or
    /// malformed file yields an empty store instead of an error.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_path(path) {
            Ok(store) => store,
            Err(e) => {
                warn!("Could not load reviews from {}: {}", path.display(), e);
                Self::new(Vec::new())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Clone the record at `index`.
    pub fn get(&self, index: usize) -> Option<ReviewRecord> {
        self.read().get(index).cloned()
    }

    /// Immutable copy of every record, in store order.
    pub fn snapshot(&self) -> Arc<[ReviewRecord]> {
        self.read().iter().cloned().collect()
    }

    /// The given field of every record, in store order.
    pub fn field_texts(&self, field: ReviewField) -> Vec<String> {
        self.read()
            .iter()
            .map(|review| review.field(field).to_string())
            .collect()
    }

    /// Overwrite one field of the record at `index`.
    pub fn apply_translation(&self, index: usize, field: ReviewField, text: &str) -> Result<()> {
        {
            let mut records = self.write();
            let len = records.len();
            let record = records
                .get_mut(index)
                .ok_or(TranslationError::IndexOutOfRange { index, len })?;
            *record.field_mut(field) = text.to_string();
        }
        self.bump_revision();
        Ok(())
    }

    /// Replace the record at `index`. The stored id is kept.
    pub fn replace(&self, index: usize, mut record: ReviewRecord) -> Result<()> {
        {
            let mut records = self.write();
            let len = records.len();
            let slot = records
                .get_mut(index)
                .ok_or(TranslationError::IndexOutOfRange { index, len })?;
            if record.id != slot.id {
                warn!(
                    "Replacement for review {} carries id {}, keeping {}",
                    index, record.id, slot.id
                );
                record.id = slot.id;
            }
            *slot = record;
        }
        self.bump_revision();
        Ok(())
    }

    /// Watch for writes. The value is a revision counter that increases by
    /// one for every applied write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision counter.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<ReviewRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<ReviewRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "Cafe A",
            "address": "1 Main St",
            "description": "Cozy corner",
            "highlights": "Flat white",
            "price_range": "$$",
            "rating": 4.5
        },
        {
            "name": "Cafe B",
            "address": "2 Side St",
            "description": "Loud and bright",
            "highlights": "Croissants",
            "price_range": "$",
            "rating": 3
        }
    ]"#;

    fn sample_store() -> ReviewStore {
        ReviewStore::load(SAMPLE.as_bytes()).expect("sample should decode")
    }

    // ==================== Decoding Tests ====================

    #[test]
    fn test_decode_sample() {
        let reviews = decode_reviews(SAMPLE.as_bytes()).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].name, "Cafe A");
        assert_eq!(reviews[1].price_range, "$");
        assert!((reviews[1].rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_generates_distinct_ids() {
        let reviews = decode_reviews(SAMPLE.as_bytes()).unwrap();
        assert_ne!(reviews[0].id, reviews[1].id);
    }

    #[test]
    fn test_decode_keeps_explicit_id() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"[{{"id":"{}","name":"n","address":"a","description":"d","highlights":"h","price_range":"$","rating":1}}]"#,
            id
        );
        let reviews = decode_reviews(json.as_bytes()).unwrap();
        assert_eq!(reviews[0].id, id);
    }

    #[test]
    fn test_decode_empty_array() {
        let reviews = decode_reviews(b"[]").unwrap();
        assert!(reviews.is_empty());
    }

    #[test]
    fn test_decode_malformed_json() {
        let result = decode_reviews(b"[{\"name\": ");
        assert!(matches!(result, Err(TranslationError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_field_rejects_everything() {
        let json = r#"[
            {"name":"ok","address":"a","description":"d","highlights":"h","price_range":"$","rating":1},
            {"name":"broken","address":"a","description":"d","price_range":"$","rating":1}
        ]"#;
        let result = decode_reviews(json.as_bytes());
        assert!(matches!(result, Err(TranslationError::Decode(_))));
    }

    #[test]
    fn test_decode_mistyped_field() {
        let json = r#"[{"name":"n","address":"a","description":"d","highlights":"h","price_range":"$","rating":"five"}]"#;
        assert!(decode_reviews(json.as_bytes()).is_err());
    }

    #[test]
    fn test_decode_rating_out_of_range() {
        let json = r#"[{"name":"n","address":"a","description":"d","highlights":"h","price_range":"$","rating":5.5}]"#;
        let err = decode_reviews(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("rating"));
    }

    #[test]
    fn test_decode_duplicate_id() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"[{{"id":"{id}","name":"a","address":"a","description":"d","highlights":"h","price_range":"$","rating":1}},
                {{"id":"{id}","name":"b","address":"a","description":"d","highlights":"h","price_range":"$","rating":1}}]"#
        );
        let err = decode_reviews(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("repeats id"));
    }

    // ==================== Store Tests ====================

    #[test]
    fn test_apply_translation_overwrites_field() {
        let store = sample_store();
        store
            .apply_translation(1, ReviewField::Description, "Ruidoso y luminoso")
            .unwrap();

        let review = store.get(1).unwrap();
        assert_eq!(review.description, "Ruidoso y luminoso");
        assert_eq!(review.highlights, "Croissants");
        assert_eq!(store.get(0).unwrap().description, "Cozy corner");
    }

    #[test]
    fn test_apply_translation_out_of_range() {
        let store = sample_store();
        let result = store.apply_translation(2, ReviewField::Name, "x");
        assert!(matches!(
            result,
            Err(TranslationError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_apply_translation_is_idempotent() {
        let once = sample_store();
        once.apply_translation(0, ReviewField::Name, "Café A").unwrap();

        let twice = sample_store();
        twice.apply_translation(0, ReviewField::Name, "Café A").unwrap();
        twice.apply_translation(0, ReviewField::Name, "Café A").unwrap();

        assert_eq!(once.get(0).unwrap().name, twice.get(0).unwrap().name);
    }

    #[test]
    fn test_field_texts_in_order() {
        let store = sample_store();
        assert_eq!(store.field_texts(ReviewField::Name), vec!["Cafe A", "Cafe B"]);
        assert_eq!(
            store.field_texts(ReviewField::Highlights),
            vec!["Flat white", "Croissants"]
        );
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = sample_store();
        let before = store.snapshot();
        store.apply_translation(0, ReviewField::Name, "Changed").unwrap();

        assert_eq!(before[0].name, "Cafe A");
        assert_eq!(store.snapshot()[0].name, "Changed");
    }

    #[test]
    fn test_serialized_snapshot_reloads_with_same_ids() {
        let store = sample_store();
        store.apply_translation(1, ReviewField::Name, "Café B").unwrap();

        let json = serde_json::to_string_pretty(&*store.snapshot()).unwrap();
        let reloaded = ReviewStore::load(json.as_bytes()).unwrap();

        assert_eq!(reloaded.snapshot(), store.snapshot());
        assert_eq!(reloaded.get(1).unwrap().name, "Café B");
    }

    #[test]
    fn test_replace_keeps_id() {
        let store = sample_store();
        let original = store.get(0).unwrap();
        let mut replacement = original.clone();
        replacement.id = Uuid::new_v4();
        replacement.description = "Rincón acogedor".to_string();

        store.replace(0, replacement).unwrap();

        let stored = store.get(0).unwrap();
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.description, "Rincón acogedor");
    }

    #[test]
    fn test_replace_out_of_range() {
        let store = sample_store();
        let record = store.get(0).unwrap();
        assert!(store.replace(5, record).is_err());
    }

    #[test]
    fn test_new_empty_store() {
        let store = ReviewStore::new(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.get(0).is_none());
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let store = ReviewStore::load_or_empty("/definitely/not/here.json");
        assert!(store.is_empty());
    }

    // ==================== Change Notification Tests ====================

    #[tokio::test]
    async fn test_subscribe_sees_writes() {
        let store = sample_store();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow_and_update(), 0);

        store.apply_translation(0, ReviewField::Name, "A2").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        store.apply_translation(1, ReviewField::Name, "B2").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
    }

    #[test]
    fn test_field_display() {
        assert_eq!(ReviewField::Name.to_string(), "name");
        assert_eq!(ReviewField::Description.to_string(), "description");
        assert_eq!(ReviewField::Highlights.to_string(), "highlights");
    }
}
