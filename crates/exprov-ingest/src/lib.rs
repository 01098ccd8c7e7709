//! Provenance log ingestion
//!
//! Raw operator-supplied text arrives in one of two shapes:
//!
//! - a single JSON array of record objects, or
//! - line-delimited JSON: one record object per line.
//!
//! Shape detection is line-based: after splitting into trimmed non-empty
//! lines and dropping duplicate lines, more than one remaining line selects
//! the line-delimited path; exactly one selects whole-document array parsing.
//!
//! The two paths fail differently on purpose:
//!
//! - Line-delimited parsing is tolerant. A line that is not valid JSON (or
//!   not a record object) is dropped and the rest of the batch survives.
//! - Whole-document parsing is strict at the top level: invalid JSON is a
//!   [`IngestError::Parse`], valid JSON that is not an array is a
//!   [`IngestError::Format`].
//!
//! Neither failure is fatal to the caller; the expected recovery is to fall
//! back to [`exprov_model::example_records`] and surface a notice. Empty
//! input is not an error at all — it is the explicit "use the example"
//! signal, reported as [`ParsedInput::Empty`] so callers can branch on it
//! without sentinel values.
//!
//! No field-level schema validation happens here. A record object with
//! missing fields deserializes to empty strings and surfaces downstream as
//! rendering gaps, not ingestion failures.

use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use exprov_model::ProvenanceRecord;

/// Successful ingestion outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// Parsed record batch. May be empty when every line of a line-delimited
    /// input was dropped.
    Records(Vec<ProvenanceRecord>),
    /// No text supplied (empty or all-whitespace input).
    Empty,
}

#[derive(Debug, Error)]
pub enum IngestError {
    /// The text is valid JSON in neither supported shape.
    #[error("input is not valid JSON: {0}")]
    Parse(String),
    /// The text parsed as JSON but the top level is not an array.
    #[error("input parsed as JSON but is not a top-level array of records")]
    Format,
}

/// Parse raw provenance text into a record batch.
pub fn parse_provenance(text: &str) -> Result<ParsedInput, IngestError> {
    let lines = distinct_nonempty_lines(text);
    if lines.is_empty() {
        return Ok(ParsedInput::Empty);
    }
    if lines.len() > 1 {
        return Ok(ParsedInput::Records(parse_line_delimited(&lines)));
    }
    // Exactly one distinct non-empty line: parse the *entire* original text
    // as one JSON document. A single record object repeated across many
    // lines dedupes down to this branch and fails whole-document parsing,
    // which matches the array-only contract for non-delimited input.
    parse_array_document(text).map(ParsedInput::Records)
}

/// Split into trimmed non-empty lines, keeping only the first occurrence of
/// each duplicate line.
fn distinct_nonempty_lines(text: &str) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .collect()
}

fn parse_line_delimited(lines: &[&str]) -> Vec<ProvenanceRecord> {
    let mut records = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => match record_from_value(value) {
                Some(record) => records.push(record),
                None => debug!(line = idx + 1, "dropping non-record line"),
            },
            Err(err) => {
                debug!(line = idx + 1, %err, "dropping unparseable line");
            }
        }
    }
    records
}

fn parse_array_document(text: &str) -> Result<Vec<ProvenanceRecord>, IngestError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| IngestError::Parse(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(IngestError::Format);
    };
    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match record_from_value(item) {
            Some(record) => records.push(record),
            None => debug!(index = idx, "dropping non-record array element"),
        }
    }
    Ok(records)
}

/// Records must be JSON objects. Field contents are unvalidated, but a
/// wrongly typed field (e.g. `arguments` as a number) drops the record the
/// same way a non-object does.
fn record_from_value(value: Value) -> Option<ProvenanceRecord> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}
