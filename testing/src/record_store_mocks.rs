//! In-memory record store test doubles
//!
//! Provides fast, deterministic stand-ins for the file-backed store:
//! - [`InMemoryRecordStore`]: `Vec`-backed store that behaves like a healthy file
//! - [`FailingRecordStore`]: store whose appends always fail (full disk, bad permissions)

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use rsvp_core::record::{ColumnSchema, Record};
use rsvp_core::record_store::{PersistenceError, RecordStore};
use std::sync::{Arc, RwLock};

/// In-memory record store for fast, deterministic testing.
///
/// Clones share the same underlying records.
///
/// # Example
///
/// ```
/// use rsvp_testing::InMemoryRecordStore;
/// use rsvp_core::{ColumnSchema, RecordStore};
///
/// let store = InMemoryRecordStore::new(ColumnSchema::buildathon());
/// assert!(store.load().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryRecordStore {
    schema: ColumnSchema,
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store for `schema`
    #[must_use]
    pub fn new(schema: ColumnSchema) -> Self {
        Self::with_records(schema, Vec::new())
    }

    /// Create a store pre-populated with `records`
    #[must_use]
    pub fn with_records(schema: ColumnSchema, records: Vec<Record>) -> Self {
        Self {
            schema,
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Remove every record (for test isolation)
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    fn load(&self) -> Vec<Record> {
        self.records.read().unwrap().clone()
    }

    fn append(&self, record: Record) -> Result<(), PersistenceError> {
        let record = record.conform_to(&self.schema);
        self.records.write().unwrap().push(record);
        Ok(())
    }
}

/// Store whose reads succeed but whose appends always fail.
///
/// Used to check that persistence failures reach the caller and that
/// nothing is reported as saved.
#[derive(Clone, Debug)]
pub struct FailingRecordStore {
    inner: InMemoryRecordStore,
    reason: String,
}

impl FailingRecordStore {
    /// Create an empty failing store
    #[must_use]
    pub fn new(schema: ColumnSchema, reason: impl Into<String>) -> Self {
        Self {
            inner: InMemoryRecordStore::new(schema),
            reason: reason.into(),
        }
    }

    /// Create a failing store that still serves `records`
    #[must_use]
    pub fn with_records(
        schema: ColumnSchema,
        records: Vec<Record>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            inner: InMemoryRecordStore::with_records(schema, records),
            reason: reason.into(),
        }
    }
}

impl RecordStore for FailingRecordStore {
    fn schema(&self) -> &ColumnSchema {
        self.inner.schema()
    }

    fn load(&self) -> Vec<Record> {
        self.inner.load()
    }

    fn append(&self, _record: Record) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable(self.reason.clone()))
    }
}
