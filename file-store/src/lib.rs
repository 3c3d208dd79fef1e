//! CSV file record store for the RSVP registration manager.
//!
//! This crate provides the durable [`RecordStore`] used in production: one
//! UTF-8 CSV file per event configuration, with a header row naming the
//! schema's columns and one row per registration in append order.
//!
//! Every append is a read-modify-write of the whole file. The new contents
//! are written to a sibling `*.tmp` file and renamed over the store, so a
//! failed write leaves the previous file intact. An append never rewrites a
//! file it cannot fully decode; it fails with
//! [`PersistenceError::Corrupt`] instead, while `load` reads such a file as
//! empty. There is no locking: two processes appending at the same moment
//! can lose one record.
//!
//! # Example
//!
//! ```no_run
//! use rsvp_core::{ColumnSchema, RecordStore};
//! use rsvp_file_store::FileRecordStore;
//!
//! let store = FileRecordStore::new("data/rsvps.csv", ColumnSchema::buildathon());
//! println!("{} registrations", store.load().len());
//! ```

use rsvp_core::record::{ColumnSchema, Record};
use rsvp_core::record_store::{PersistenceError, RecordStore};
use rsvp_core::table;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Record store backed by a CSV file.
#[derive(Clone, Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    schema: ColumnSchema,
}

impl FileRecordStore {
    /// Creates a store for the file at `path`.
    ///
    /// Nothing is touched on disk until the first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, schema: ColumnSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Read every stored record, failing on anything short of a clean decode.
    ///
    /// A missing file is an empty store.
    fn read_existing(&self) -> Result<Vec<Record>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Record store file not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        table::read_records(&self.schema, BufReader::new(file)).map_err(|source| {
            PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Replace the file contents with `records`.
    fn write_all(&self, records: &[Record]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(parent, e))?;
        }

        let mut buffer = Vec::new();
        table::write_records(&self.schema, records, &mut buffer)?;

        let temp = self.temp_path();
        fs::write(&temp, &buffer).map_err(|e| Self::io_error(&temp, e))?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(&self.path, e));
        }

        Ok(())
    }
}

impl RecordStore for FileRecordStore {
    fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    fn load(&self) -> Vec<Record> {
        self.read_existing().unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Record store unreadable, treating as empty"
            );
            Vec::new()
        })
    }

    fn append(&self, record: Record) -> Result<(), PersistenceError> {
        let mut records = self.read_existing().inspect_err(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Refusing to rewrite a record store that cannot be read"
            );
        })?;
        records.push(record.conform_to(&self.schema));

        self.write_all(&records).inspect_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist record");
        })?;

        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "Record store rewritten"
        );
        Ok(())
    }
}
