//! Versioned records — the unit of persistence.
//!
//! A record captures one pipeline stage of one document. Records are never
//! updated or deleted; a correction is a new record with a higher version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Provenance tag: where a record's text came from.
///
/// The named variants cover the standard scrape → rewrite → review →
/// edit/approve pipeline. The set is open in practice, so unknown tokens
/// round-trip through [`Stage::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
  /// Original scrape.
  Og,
  /// First AI rewrite.
  Spun,
  /// First AI review pass.
  Reviewed,
  HumanEdited,
  Respun,
  Rereviewed,
  /// Escape hatch for stages outside the standard pipeline.
  Custom(String),
}

impl Stage {
  /// The token persisted in record ids and metadata.
  pub fn as_token(&self) -> &str {
    match self {
      Self::Og => "og",
      Self::Spun => "spun",
      Self::Reviewed => "reviewed",
      Self::HumanEdited => "human_edited",
      Self::Respun => "respun",
      Self::Rereviewed => "rereviewed",
      Self::Custom(token) => token,
    }
  }

  /// Parse a token; anything unrecognised becomes [`Stage::Custom`].
  pub fn from_token(token: &str) -> Self {
    match token {
      "og" => Self::Og,
      "spun" => Self::Spun,
      "reviewed" => Self::Reviewed,
      "human_edited" => Self::HumanEdited,
      "respun" => Self::Respun,
      "rereviewed" => Self::Rereviewed,
      other => Self::Custom(other.to_owned()),
    }
  }
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_token())
  }
}

impl std::str::FromStr for Stage {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::from_token(s)) }
}

// Stages travel as their bare token in JSON bodies and query strings.
impl Serialize for Stage {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_token())
  }
}

impl<'de> Deserialize<'de> for Stage {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let token = String::deserialize(deserializer)?;
    Ok(Self::from_token(&token))
  }
}

// ─── Record id ───────────────────────────────────────────────────────────────

/// Synthetic record identifier: `{doc_id}_v{version}_{stage}`.
///
/// The format is a persisted convention; existing stores depend on it
/// staying bit-exact.
pub fn record_id(doc_id: &str, version: i64, stage: &Stage) -> String {
  format!("{doc_id}_v{version}_{}", stage.as_token())
}

// ─── VersionedRecord ─────────────────────────────────────────────────────────

/// One pipeline stage of one document. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedRecord {
  /// Synthetic id, unique across the whole store; see [`record_id`].
  pub id:        String,
  pub doc_id:    String,
  /// Positive; unique within a `doc_id` and strictly increasing in creation
  /// order under the single-writer assumption.
  pub version:   i64,
  pub stage:     Stage,
  /// Full document content at this stage. May be empty.
  pub text:      String,
  /// Assigned by the recorder at write time; never caller-supplied.
  pub timestamp: DateTime<Utc>,
  /// Marks the approved representative for the document. Not enforced to be
  /// unique per doc — the highest-versioned final wins on resolution.
  pub is_final:  bool,
}

// ─── StageDraft ──────────────────────────────────────────────────────────────

/// Input to [`crate::versioning::save_stage`].
/// `id` and `timestamp` are always derived by the recorder; they are not
/// accepted from callers.
#[derive(Debug, Clone)]
pub struct StageDraft {
  pub doc_id:   String,
  pub version:  i64,
  pub stage:    Stage,
  pub text:     String,
  pub is_final: bool,
}

impl StageDraft {
  /// Convenience constructor with the final flag unset.
  pub fn new(
    doc_id: impl Into<String>,
    version: i64,
    stage: Stage,
    text: impl Into<String>,
  ) -> Self {
    Self {
      doc_id: doc_id.into(),
      version,
      stage,
      text: text.into(),
      is_final: false,
    }
  }

  /// Mark the draft as the approved final for its document.
  pub fn finalized(mut self) -> Self {
    self.is_final = true;
    self
  }
}
