//! Encoding helpers between documents and the columns stored in SQLite.
//!
//! Timestamps in the `created_at` and `deleted_at` columns are re-encoded
//! with [`encode_timestamp`] so that plain string comparison orders them.
//! Query values are bound as the SQL type `json_extract` yields for them.

use chrono::{DateTime, Utc};
use locallink_core::store::{Document, encode_timestamp};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::{Error, Result};

// ─── Body ────────────────────────────────────────────────────────────────────

pub fn encode_document(doc: &Document) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<Document> { Ok(serde_json::from_str(s)?) }

pub fn document_id(doc: &Document) -> Result<String> {
  doc
    .get("id")
    .and_then(Value::as_str)
    .map(str::to_owned)
    .ok_or(Error::MissingId)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Normalise a timestamp field of `doc` for its column. Absent and `null`
/// fields give `None`.
pub fn timestamp_column(doc: &Document, field: &str) -> Result<Option<String>> {
  match doc.get(field) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) => Ok(Some(encode_timestamp(decode_dt(s)?))),
    Some(other) => Err(Error::DateParse(format!("{field} is not a string: {other}"))),
  }
}

// ─── Query values ────────────────────────────────────────────────────────────

/// The JSON path of a top-level field, for `json_extract`.
pub fn json_path(field: &str) -> String {
  format!("$.\"{}\"", field.replace('"', "\\\""))
}

/// Convert a JSON value to what `json_extract` returns for it: booleans are
/// integers and containers are their JSON text.
pub fn sql_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    other => SqlValue::Text(other.to_string()),
  }
}
