//! Error types for `spindle-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("doc_id must not be empty")]
  EmptyDocId,

  #[error("stage token must not be empty")]
  EmptyStage,

  #[error("version must be positive, got {0}")]
  NonPositiveVersion(i64),

  /// An expected pipeline artifact could not be read. Raised by initial
  /// ingest before any record is written.
  #[error("missing artifact {name:?} for document {doc_id:?}: {source}")]
  MissingArtifact {
    doc_id: String,
    name:   String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
