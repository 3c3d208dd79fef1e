//! Record store trait and related types.
//!
//! The store is an append-only log of registration records. It is kept to
//! two operations so that the CSV file used today can later be replaced by a
//! transactional log or a database without touching the registration
//! workflow:
//!
//! - `load` returns every record in append order
//! - `append` adds one record at the end
//!
//! # Implementations
//!
//! - `FileRecordStore` (in `rsvp-file-store`): CSV file on disk
//! - `InMemoryRecordStore` (in `rsvp-testing`): fast, deterministic testing
//!
//! # Concurrency
//!
//! Implementations are not required to serialize concurrent appends. The
//! file store rewrites the whole file on every append, so two simultaneous
//! appends can lose one record.

use crate::record::{ColumnSchema, Record};
use crate::table::TableError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting records.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The backing file could not be written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Records could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] TableError),

    /// The existing store could not be decoded, so it was not rewritten.
    #[error("existing store {} is corrupt: {source}", .path.display())]
    Corrupt {
        /// File holding the undecodable records.
        path: PathBuf,
        /// Why decoding failed.
        #[source]
        source: TableError,
    },

    /// The store refused the write for another reason.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only log of registration records.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a host can share one store
/// between request handlers.
pub trait RecordStore: Send + Sync {
    /// Column set every stored record conforms to.
    fn schema(&self) -> &ColumnSchema;

    /// Load all records in append order.
    ///
    /// Never fails: a missing, unreadable, or corrupt store reads as empty.
    fn load(&self) -> Vec<Record>;

    /// Append one record after all existing records.
    ///
    /// The record is stored conformed to [`RecordStore::schema`] (see
    /// [`Record::conform_to`]). Existing records are never dropped: a store
    /// whose current contents cannot be read back refuses the append.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the record could not be made durable.
    /// The store is left as it was before the call.
    fn append(&self, record: Record) -> Result<(), PersistenceError>;

    /// Number of stored records.
    fn count(&self) -> usize {
        self.load().len()
    }
}
