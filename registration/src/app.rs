//! Application facade tying configuration, store, workflow and gates together.
//!
//! A presentation layer (the `rsvp` CLI here) drives everything through
//! [`RegistrationApp`]. Capacity and gate checks are offered as queries; the
//! workflow itself enforces neither.

use crate::config::Config;
use crate::export;
use crate::session::{Gates, Session};
use crate::workflow::{RawFields, RegistrationError, RegistrationWorkflow};
use rsvp_core::capacity::{self, CapacityStatus};
use rsvp_core::environment::{Clock, SystemClock};
use rsvp_core::gate::{GateError, GateKind};
use rsvp_core::record::Record;
use rsvp_core::record_store::RecordStore;
use rsvp_core::table::TableError;
use rsvp_file_store::FileRecordStore;
use std::sync::Arc;

/// The registration manager for one event.
#[derive(Clone)]
pub struct RegistrationApp {
    config: Config,
    store: Arc<dyn RecordStore>,
    workflow: RegistrationWorkflow,
    gates: Gates,
}

impl RegistrationApp {
    /// Assemble an app over an arbitrary store and clock
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        let workflow = RegistrationWorkflow::new(Arc::clone(&store), clock);
        let gates = Gates::from_config(&config.access);
        Self {
            config,
            store,
            workflow,
            gates,
        }
    }

    /// Assemble an app over the configured CSV file and the system clock
    #[must_use]
    pub fn open(config: Config) -> Self {
        let store = FileRecordStore::new(
            config.storage.data_path.clone(),
            config.event.schema.clone(),
        );
        tracing::debug!(path = %store.path().display(), "Opening record store");
        Self::new(config, Arc::new(store), Arc::new(SystemClock))
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// A fresh visitor session with every configured gate locked
    #[must_use]
    pub const fn start_session(&self) -> Session {
        Session::new(&self.gates)
    }

    /// All stored registrations, oldest first
    #[must_use]
    pub fn load_records(&self) -> Vec<Record> {
        self.store.load()
    }

    /// Submit one registration.
    ///
    /// # Errors
    ///
    /// See [`RegistrationWorkflow::submit`].
    pub fn submit_registration(&self, raw: &RawFields) -> Result<Record, RegistrationError> {
        self.workflow.submit(raw)
    }

    /// Number of stored registrations
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.store.count()
    }

    /// Seats remaining before the waitlist notice appears
    #[must_use]
    pub fn seats_left(&self) -> usize {
        capacity::seats_left(self.registration_count(), self.config.event.registration_limit)
    }

    /// Whether the event has reached its registration limit
    #[must_use]
    pub fn is_over_capacity(&self) -> bool {
        capacity::is_over_capacity(self.registration_count(), self.config.event.registration_limit)
    }

    /// Current capacity status
    #[must_use]
    pub fn capacity_status(&self) -> CapacityStatus {
        CapacityStatus::evaluate(self.registration_count(), self.config.event.registration_limit)
    }

    /// Whether registration is offered at all
    #[must_use]
    pub const fn invite_enabled(&self) -> bool {
        self.gates.get(GateKind::Invite).is_configured()
    }

    /// Whether the admin view is offered at all
    #[must_use]
    pub const fn admin_enabled(&self) -> bool {
        self.gates.get(GateKind::Admin).is_configured()
    }

    /// Check an invite code for `session`; returns whether the form is unlocked.
    pub fn verify_invite(&self, session: &mut Session, input: &str) -> bool {
        self.verify(session, GateKind::Invite, input).is_ok()
    }

    /// Check the admin password for `session`; returns whether the admin view is unlocked.
    pub fn verify_admin(&self, session: &mut Session, input: &str) -> bool {
        self.verify(session, GateKind::Admin, input).is_ok()
    }

    /// Check `input` against the gate of `kind`, reporting why it stayed closed.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the gate did not open.
    pub fn verify(
        &self,
        session: &mut Session,
        kind: GateKind,
        input: &str,
    ) -> Result<(), GateError> {
        self.gates.verify(session, kind, input)
    }

    /// Render `records` as CSV in this event's column order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the encoder fails.
    pub fn export_csv(&self, records: &[Record]) -> Result<String, TableError> {
        export::export_csv(&self.config.event.schema, records)
    }
}

impl std::fmt::Debug for RegistrationApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationApp")
            .field("config", &self.config)
            .field("gates", &self.gates)
            .finish_non_exhaustive()
    }
}
