//! CSV codec for registration records.
//!
//! The same encoding is used for the durable store file and for the admin
//! export: one header row naming the schema's columns, then one row per
//! record in store order.

use crate::record::{self, ColumnSchema, EMAIL, NAME, Record, TIMESTAMP, ValidationError};
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;

/// Errors from reading or writing the tabular form.
#[derive(Error, Debug)]
pub enum TableError {
    /// The underlying CSV reader or writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The header row lacks a fixed column.
    #[error("missing column `{0}` in header")]
    MissingColumn(&'static str),

    /// A row's timestamp could not be parsed.
    #[error("row {row}: invalid timestamp `{value}`")]
    InvalidTimestamp {
        /// 1-based data row number (header excluded).
        row: usize,
        /// The offending cell.
        value: String,
    },

    /// A row had a blank required field.
    #[error("row {row}: {source}")]
    InvalidRecord {
        /// 1-based data row number (header excluded).
        row: usize,
        /// Why the row is not a valid record.
        #[source]
        source: ValidationError,
    },
}

/// Write `records` as CSV in schema column order, header first.
///
/// # Errors
///
/// Returns [`TableError`] if the writer fails.
pub fn write_records<W: io::Write>(
    schema: &ColumnSchema,
    records: &[Record],
    writer: W,
) -> Result<(), TableError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(schema.columns())?;

    for record in records {
        csv.write_record(schema.columns().map(|column| record.value(column).into_owned()))?;
    }

    csv.flush()?;
    Ok(())
}

/// Read records from CSV laid out for `schema`.
///
/// Columns are matched by header name. Optional schema columns missing from
/// the header read as empty; columns outside the schema are ignored.
///
/// # Errors
///
/// Returns [`TableError`] if the input is not valid CSV, lacks a fixed
/// column, or contains a row that is not a valid record.
pub fn read_records<R: io::Read>(
    schema: &ColumnSchema,
    reader: R,
) -> Result<Vec<Record>, TableError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h.trim() == column);

    let timestamp_at = position(TIMESTAMP).ok_or(TableError::MissingColumn(TIMESTAMP))?;
    let name_at = position(NAME).ok_or(TableError::MissingColumn(NAME))?;
    let email_at = position(EMAIL).ok_or(TableError::MissingColumn(EMAIL))?;
    let optional_at: Vec<(&str, Option<usize>)> = schema
        .optional_fields()
        .iter()
        .map(|field| (field.as_str(), position(field)))
        .collect();

    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let number = index + 1;
        let cell = |at: usize| row.get(at).unwrap_or_default();

        let raw_timestamp = cell(timestamp_at);
        let timestamp =
            record::parse_timestamp(raw_timestamp).ok_or_else(|| TableError::InvalidTimestamp {
                row: number,
                value: raw_timestamp.to_string(),
            })?;

        let details: BTreeMap<String, String> = optional_at
            .iter()
            .map(|(field, at)| ((*field).to_string(), at.map(cell).unwrap_or_default().to_string()))
            .collect();

        let record = Record::new(timestamp, cell(name_at), cell(email_at), details)
            .map_err(|source| TableError::InvalidRecord { row: number, source })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(name: &str, interests: &str) -> Record {
        let mut details = BTreeMap::new();
        details.insert("affiliation".to_string(), String::new());
        details.insert("role".to_string(), "Engineer".to_string());
        details.insert("interests".to_string(), interests.to_string());
        Record::new(
            Utc.with_ymd_and_hms(2025, 10, 18, 9, 30, 0).unwrap(),
            name,
            format!("{}@example.com", name.to_lowercase()),
            details,
        )
        .unwrap()
    }

    fn encode(records: &[Record]) -> String {
        let mut out = Vec::new();
        write_records(&ColumnSchema::buildathon(), records, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_header_for_empty_table() {
        assert_eq!(
            encode(&[]),
            "timestamp,name,email,affiliation,role,interests\n"
        );
    }

    #[test]
    fn quotes_embedded_delimiters() {
        let text = encode(&[record("Ada", "agents, \"evals\"\nand RAG")]);
        assert!(text.contains("\"agents, \"\"evals\"\"\nand RAG\""));

        let back = read_records(&ColumnSchema::buildathon(), text.as_bytes()).unwrap();
        assert_eq!(back[0].detail("interests"), "agents, \"evals\"\nand RAG");
    }

    #[test]
    fn preserves_row_order() {
        let records = vec![record("Ada", "a"), record("Grace", "b"), record("Alan", "c")];
        let back = read_records(&ColumnSchema::buildathon(), encode(&records).as_bytes()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn reads_by_header_name_and_fills_missing_optionals() {
        let text = "email,name,timestamp,extra\nada@example.com,Ada,2025-10-18T09:00:00,x\n";
        let back = read_records(&ColumnSchema::buildathon(), text.as_bytes()).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].name(), "Ada");
        assert_eq!(back[0].detail("role"), "");
        assert_eq!(back[0].details().len(), 3);
    }

    #[test]
    fn rejects_missing_fixed_column() {
        let err = read_records(&ColumnSchema::buildathon(), "name,email\nAda,a@b.c\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("timestamp")));
    }

    #[test]
    fn rejects_bad_rows() {
        let bad_time = "timestamp,name,email\nsoon,Ada,a@b.c\n";
        assert!(matches!(
            read_records(&ColumnSchema::buildathon(), bad_time.as_bytes()),
            Err(TableError::InvalidTimestamp { row: 1, .. })
        ));

        let blank_name = "timestamp,name,email\n2025-10-18T09:00:00Z, ,a@b.c\n";
        assert!(matches!(
            read_records(&ColumnSchema::buildathon(), blank_name.as_bytes()),
            Err(TableError::InvalidRecord { row: 1, .. })
        ));

        let ragged = "timestamp,name,email\n2025-10-18T09:00:00Z,Ada\n";
        assert!(matches!(
            read_records(&ColumnSchema::buildathon(), ragged.as_bytes()),
            Err(TableError::Csv(_))
        ));
    }
}
