//! Admin export of all registrations as CSV.

use chrono::NaiveDate;
use rsvp_core::record::{ColumnSchema, Record};
use rsvp_core::table::{self, TableError};

/// Serialize `records` as CSV: header row in schema order, then one row per
/// record in store order.
///
/// # Errors
///
/// Returns [`TableError`] only if the CSV encoder itself fails; records that
/// conform to `schema` always encode.
pub fn export_csv(schema: &ColumnSchema, records: &[Record]) -> Result<String, TableError> {
    let mut buffer = Vec::new();
    table::write_records(schema, records, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Default download name for an export made on `date`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("rsvps-{}.csv", date.format("%Y-%m-%d"))
}
