//! Configuration management for the registration manager.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Secrets are never defaulted: an unset or blank secret disables its gate.

use rsvp_core::gate::Secret;
use rsvp_core::record::{ColumnSchema, SchemaError};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Default capacity of the event
pub const DEFAULT_REGISTRATION_LIMIT: usize = 30;

/// Errors in the configured values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `RSVP_EVENT_VARIANT` named no known form.
    #[error("unknown event variant `{0}` (expected `buildathon` or `referral`)")]
    UnknownVariant(String),

    /// `RSVP_FIELDS` did not describe a usable column set.
    #[error("invalid RSVP_FIELDS: {0}")]
    Fields(#[from] SchemaError),
}

/// Which sign-up form the event uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventVariant {
    /// Open buildathon form: affiliation, role, interests
    Buildathon,
    /// Invite-only form: phone, inviter
    Referral,
}

impl EventVariant {
    /// Default column set of this form
    #[must_use]
    pub fn schema(self) -> ColumnSchema {
        match self {
            Self::Buildathon => ColumnSchema::buildathon(),
            Self::Referral => ColumnSchema::referral(),
        }
    }
}

impl FromStr for EventVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buildathon" => Ok(Self::Buildathon),
            "referral" => Ok(Self::Referral),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Event details and capacity
    pub event: EventConfig,
    /// Gate secrets
    pub access: AccessConfig,
    /// Where records are stored
    pub storage: StorageConfig,
}

/// Event configuration
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Display title
    pub title: String,
    /// Display date
    pub date: String,
    /// Display city
    pub city: String,
    /// One-line description
    pub tagline: String,
    /// Intended number of registrants (advisory)
    pub registration_limit: usize,
    /// Sign-up form in use
    pub variant: EventVariant,
    /// Column set of the store, from the variant or `RSVP_FIELDS`
    pub schema: ColumnSchema,
}

/// Gate secrets
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Invite code guarding registration
    pub invite_code: Option<Secret>,
    /// Password guarding the admin view
    pub admin_password: Option<Secret>,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// CSV file holding all registrations
    pub data_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the event variant or field list is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the event variant or field list is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let variant = lookup("RSVP_EVENT_VARIANT")
            .map(|v| v.parse::<EventVariant>())
            .transpose()?
            .unwrap_or(EventVariant::Buildathon);

        let schema = match lookup("RSVP_FIELDS") {
            Some(fields) if !fields.trim().is_empty() => ColumnSchema::new(fields.split(','))?,
            _ => variant.schema(),
        };

        Ok(Self {
            event: EventConfig {
                title: text("RSVP_EVENT_TITLE", "Cologne AI Buildathon"),
                date: text("RSVP_EVENT_DATE", "October 18, 2025"),
                city: text("RSVP_EVENT_CITY", "Cologne, Germany"),
                tagline: text("RSVP_EVENT_TAGLINE", "A one-day sprint to build AI apps"),
                registration_limit: lookup("RSVP_REGISTRATION_LIMIT")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_REGISTRATION_LIMIT),
                variant,
                schema,
            },
            access: AccessConfig {
                invite_code: lookup("RSVP_INVITE_CODE").as_deref().and_then(Secret::new),
                admin_password: lookup("RSVP_ADMIN_PASSWORD").as_deref().and_then(Secret::new),
            },
            storage: StorageConfig {
                data_path: lookup("RSVP_DATA_PATH")
                    .map_or_else(|| PathBuf::from("data/rsvps.csv"), PathBuf::from),
            },
        })
    }
}
