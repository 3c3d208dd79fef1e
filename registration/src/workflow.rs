//! Registration workflow: validate, normalize, persist.
//!
//! The workflow knows nothing about gates or capacity. Callers decide
//! whether to offer the form at all; once a submission arrives it is
//! accepted whenever its required fields are present.

use rsvp_core::environment::Clock;
use rsvp_core::record::{ColumnSchema, EMAIL, NAME, Record, ValidationError};
use rsvp_core::record_store::{PersistenceError, RecordStore};
use rsvp_core::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Raw form input: field name to the text as entered
pub type RawFields = BTreeMap<String, String>;

/// Why a submission was not recorded.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A required field was missing; nothing was stored.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record was valid but could not be stored.
    #[error("could not save your registration: {0}")]
    Persistence(#[from] PersistenceError),
}

impl RegistrationError {
    /// Message suitable for showing to the registrant
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.user_message().to_string(),
            Self::Persistence(e) => format!("Could not save your RSVP: {e}"),
        }
    }
}

/// Build a record from raw input.
///
/// Every value is trimmed and the email is lowercased. Optional schema
/// fields missing from `raw` are stored empty; keys outside the schema are
/// dropped.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequired`] if `name` or `email` is
/// absent or blank.
pub fn normalize(
    schema: &ColumnSchema,
    raw: &RawFields,
    timestamp: DateTime<Utc>,
) -> Result<Record, ValidationError> {
    let field = |key: &str| raw.get(key).map_or("", |v| v.trim());

    for key in raw.keys() {
        if key != NAME && key != EMAIL && !schema.has_optional(key) {
            tracing::debug!(field = %key, "Ignoring field outside the schema");
        }
    }

    let details = schema
        .optional_fields()
        .iter()
        .map(|name| (name.clone(), field(name).to_string()))
        .collect();

    Record::new(timestamp, field(NAME), field(EMAIL).to_lowercase(), details)
}

/// Accepts submissions and appends them to a record store.
#[derive(Clone)]
pub struct RegistrationWorkflow {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RegistrationWorkflow {
    /// Creates a new `RegistrationWorkflow`
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Validate, stamp, and persist one submission.
    ///
    /// The returned record is exactly what was stored.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Validation`] if a required field is missing
    /// - [`RegistrationError::Persistence`] if the store rejected the append
    pub fn submit(&self, raw: &RawFields) -> Result<Record, RegistrationError> {
        let record = normalize(self.store.schema(), raw, self.clock.now())
            .inspect_err(|e| tracing::info!(error = %e, "Registration rejected"))?;

        self.store.append(record.clone()).inspect_err(|e| {
            tracing::warn!(error = %e, "Registration could not be saved");
        })?;

        tracing::info!(timestamp = %record.timestamp(), "Registration accepted");
        Ok(record)
    }
}

impl std::fmt::Debug for RegistrationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationWorkflow")
            .field("schema", self.store.schema())
            .finish_non_exhaustive()
    }
}
