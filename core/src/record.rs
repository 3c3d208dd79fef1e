//! Registration records and the column schema they conform to.
//!
//! A [`Record`] can only be built through [`Record::new`], which rejects blank
//! required fields, so every record that exists has a name and an email.
//! Records carry no schema of their own: the store's [`ColumnSchema`] decides
//! which optional fields are written and in what order.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Column holding the acceptance instant
pub const TIMESTAMP: &str = "timestamp";
/// Column holding the registrant's name
pub const NAME: &str = "name";
/// Column holding the registrant's email
pub const EMAIL: &str = "email";

/// Columns present in every event configuration, in storage order
pub const FIXED_COLUMNS: [&str; 3] = [TIMESTAMP, NAME, EMAIL];

/// A submission was missing something it needs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were absent or blank after trimming.
    #[error("missing required field(s): {}", .fields.join(", "))]
    MissingRequired {
        /// The required fields that were missing, in column order.
        fields: Vec<&'static str>,
    },
}

impl ValidationError {
    /// Message suitable for showing to the person filling in the form
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingRequired { .. } => "Please provide at least your name and email.",
        }
    }
}

/// The configured optional columns are unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// An optional column name was blank.
    #[error("optional column names must not be empty")]
    EmptyName,

    /// An optional column reused one of the fixed columns.
    #[error("column `{0}` is reserved")]
    Reserved(String),

    /// An optional column was listed twice.
    #[error("column `{0}` is listed more than once")]
    Duplicate(String),
}

/// Fixed column set of one event configuration.
///
/// Every schema starts with `timestamp, name, email`, followed by the
/// event-specific optional columns in configuration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    optional: Vec<String>,
}

impl ColumnSchema {
    /// Build a schema from the optional column names.
    ///
    /// Names are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a name is blank, shadows a fixed column,
    /// or appears twice.
    pub fn new<I, S>(optional: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for name in optional {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if FIXED_COLUMNS.contains(&name.as_str()) {
                return Err(SchemaError::Reserved(name));
            }
            if !seen.insert(name.clone()) {
                return Err(SchemaError::Duplicate(name));
            }
            columns.push(name);
        }

        Ok(Self { optional: columns })
    }

    /// Columns of the one-day buildathon sign-up form
    #[must_use]
    pub fn buildathon() -> Self {
        Self::from_static(&["affiliation", "role", "interests"])
    }

    /// Columns of the invite-only referral form
    #[must_use]
    pub fn referral() -> Self {
        Self::from_static(&["phone", "inviter"])
    }

    fn from_static(names: &[&str]) -> Self {
        Self {
            optional: names.iter().map(ToString::to_string).collect(),
        }
    }

    /// Optional columns, in storage order
    #[must_use]
    pub fn optional_fields(&self) -> &[String] {
        &self.optional
    }

    /// All columns, fixed first, in storage order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.optional.iter().map(String::as_str))
    }

    /// Number of columns including the fixed ones
    #[must_use]
    pub fn len(&self) -> usize {
        FIXED_COLUMNS.len() + self.optional.len()
    }

    /// A schema always has its fixed columns
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `column` is one of this schema's optional columns
    #[must_use]
    pub fn has_optional(&self, column: &str) -> bool {
        self.optional.iter().any(|c| c == column)
    }
}

/// One validated, persisted registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    timestamp: DateTime<Utc>,
    name: String,
    email: String,
    #[serde(flatten)]
    details: BTreeMap<String, String>,
}

impl Record {
    /// Creates a record.
    ///
    /// Values are stored as given; normalization is the caller's job. The
    /// timestamp is truncated to microseconds, the precision of the stored
    /// form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] if `name` or `email` is
    /// blank after trimming.
    pub fn new(
        timestamp: DateTime<Utc>,
        name: impl Into<String>,
        email: impl Into<String>,
        details: BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let email = email.into();

        let mut missing = Vec::new();
        if name.trim().is_empty() {
            missing.push(NAME);
        }
        if email.trim().is_empty() {
            missing.push(EMAIL);
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequired { fields: missing });
        }

        Ok(Self {
            timestamp: timestamp.trunc_subsecs(6),
            name,
            email,
            details,
        })
    }

    /// When the registration was accepted
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Registrant name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registrant email
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Value of an optional field, empty when not set
    #[must_use]
    pub fn detail(&self, field: &str) -> &str {
        self.details.get(field).map_or("", String::as_str)
    }

    /// All optional field values
    #[must_use]
    pub const fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }

    /// Value of any column in its stored text form
    #[must_use]
    pub fn value(&self, column: &str) -> Cow<'_, str> {
        match column {
            TIMESTAMP => Cow::Owned(format_timestamp(&self.timestamp)),
            NAME => Cow::Borrowed(&self.name),
            EMAIL => Cow::Borrowed(&self.email),
            other => Cow::Borrowed(self.detail(other)),
        }
    }

    /// Restrict the optional fields to `schema`.
    ///
    /// Keys outside the schema are dropped and missing optional columns are
    /// set empty, so the record reads back the same from any store.
    #[must_use]
    pub fn conform_to(mut self, schema: &ColumnSchema) -> Self {
        self.details = schema
            .optional_fields()
            .iter()
            .map(|field| {
                let value = self.details.remove(field).unwrap_or_default();
                (field.clone(), value)
            })
            .collect();
        self
    }
}

/// Stored text form of a timestamp: RFC 3339, microseconds, `Z` suffix
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and naive ISO-8601 date-times, the latter read as UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, h, 0, 0).unwrap()
    }

    #[test]
    fn schema_columns_start_with_fixed() {
        let schema = ColumnSchema::buildathon();
        let columns: Vec<_> = schema.columns().collect();
        assert_eq!(
            columns,
            ["timestamp", "name", "email", "affiliation", "role", "interests"]
        );
        assert_eq!(schema.len(), 6);
    }

    #[test]
    fn schema_rejects_bad_names() {
        assert_eq!(ColumnSchema::new([" "]), Err(SchemaError::EmptyName));
        assert_eq!(
            ColumnSchema::new(["email"]),
            Err(SchemaError::Reserved("email".to_string()))
        );
        assert_eq!(
            ColumnSchema::new(["phone", " phone "]),
            Err(SchemaError::Duplicate("phone".to_string()))
        );
    }

    #[test]
    fn schema_trims_names() {
        let schema = ColumnSchema::new([" phone", "inviter "]).unwrap();
        assert_eq!(schema, ColumnSchema::referral());
    }

    #[test]
    fn record_requires_name_and_email() {
        let err = Record::new(at(9), " ", "", BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                fields: vec!["name", "email"]
            }
        );
        assert_eq!(err.to_string(), "missing required field(s): name, email");
    }

    #[test]
    fn record_value_covers_all_columns() {
        let mut details = BTreeMap::new();
        details.insert("role".to_string(), "Engineer".to_string());
        let record = Record::new(at(9), "Ada", "ada@example.com", details).unwrap();

        assert_eq!(record.value("timestamp"), "2025-10-18T09:00:00.000000Z");
        assert_eq!(record.value("name"), "Ada");
        assert_eq!(record.value("role"), "Engineer");
        assert_eq!(record.value("interests"), "");
    }

    #[test]
    fn record_truncates_to_microseconds() {
        let precise = Utc.timestamp_opt(1_760_000_000, 123_456_789).unwrap();
        let record = Record::new(precise, "Ada", "ada@example.com", BTreeMap::new()).unwrap();
        assert_eq!(record.timestamp().timestamp_subsec_nanos(), 123_456_000);
        assert_eq!(
            parse_timestamp(&record.value("timestamp")),
            Some(record.timestamp())
        );
    }

    #[test]
    fn parse_timestamp_accepts_naive_iso() {
        let parsed = parse_timestamp("2025-10-18T09:00:00.250000").unwrap();
        assert_eq!(parsed, at(9) + chrono::Duration::milliseconds(250));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn conform_to_drops_unknown_and_fills_missing() {
        let mut details = BTreeMap::new();
        details.insert("role".to_string(), "Engineer".to_string());
        details.insert("shoe_size".to_string(), "42".to_string());
        let record = Record::new(at(9), "Ada", "ada@example.com", details)
            .unwrap()
            .conform_to(&ColumnSchema::buildathon());

        let keys: Vec<_> = record.details().keys().map(String::as_str).collect();
        assert_eq!(keys, ["affiliation", "interests", "role"]);
        assert_eq!(record.detail("role"), "Engineer");
        assert_eq!(record.detail("affiliation"), "");
    }
}
