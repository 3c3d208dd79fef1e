//! # Registration
//!
//! Registration manager for a single event.
//!
//! Visitors unlock the sign-up form with a shared invite code and submit
//! their details; an organizer unlocks the admin view with a password to
//! list or export every registration. Capacity is advisory: once the limit
//! is reached the form stays open and a waitlist notice is shown.
//!
//! ## Example
//!
//! ```
//! use registration::{Config, RawFields, RegistrationApp};
//! use rsvp_core::environment::SystemClock;
//! use rsvp_testing::InMemoryRecordStore;
//! use std::sync::Arc;
//!
//! let config = Config::from_lookup(|key| match key {
//!     "RSVP_INVITE_CODE" => Some("go2025".to_string()),
//!     _ => None,
//! })?;
//! let store = Arc::new(InMemoryRecordStore::new(config.event.schema.clone()));
//! let app = RegistrationApp::new(config, store, Arc::new(SystemClock));
//!
//! let mut session = app.start_session();
//! assert!(app.verify_invite(&mut session, "go2025"));
//!
//! let mut raw = RawFields::new();
//! raw.insert("name".to_string(), "Ada".to_string());
//! raw.insert("email".to_string(), "Ada@Example.com".to_string());
//! let record = app.submit_registration(&raw)?;
//! assert_eq!(record.email(), "ada@example.com");
//! assert_eq!(app.seats_left(), 29);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod app;
pub mod config;
pub mod export;
pub mod session;
pub mod workflow;

pub use app::RegistrationApp;
pub use config::{Config, ConfigError, EventVariant};
pub use export::{export_csv, export_file_name};
pub use session::{Gates, Session};
pub use workflow::{RawFields, RegistrationError, RegistrationWorkflow};
