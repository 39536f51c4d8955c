//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Stages are stored as their bare
//! token. The final flag is stored as 0/1.

use chrono::{DateTime, Utc};
use spindle_core::record::{Stage, VersionedRecord};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_stage(stage: &Stage) -> &str { stage.as_token() }

pub fn decode_stage(s: &str) -> Stage { Stage::from_token(s) }

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `records` row.
pub struct RawRecord {
  pub record_id: String,
  pub doc_id:    String,
  pub version:   i64,
  pub stage:     String,
  pub document:  String,
  pub timestamp: String,
  pub is_final:  bool,
}

impl RawRecord {
  pub fn into_record(self) -> Result<VersionedRecord> {
    Ok(VersionedRecord {
      id:        self.record_id,
      doc_id:    self.doc_id,
      version:   self.version,
      stage:     decode_stage(&self.stage),
      text:      self.document,
      timestamp: decode_dt(&self.timestamp)?,
      is_final:  self.is_final,
    })
  }
}
