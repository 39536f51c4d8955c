//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `spindle-store-sqlite`).
//! Higher layers (`spindle-api`, `spindle-cli`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::record::{Stage, VersionedRecord};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Attribute filter for [`RecordStore::query`].
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
  /// Restrict to records of one logical document.
  pub doc_id:   Option<String>,
  /// Restrict to records with this provenance stage.
  pub stage:    Option<Stage>,
  /// Restrict by the final flag.
  pub is_final: Option<bool>,
  pub limit:    Option<usize>,
}

impl RecordQuery {
  /// All records of one document.
  pub fn for_doc(doc_id: impl Into<String>) -> Self {
    Self {
      doc_id: Some(doc_id.into()),
      ..Self::default()
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a versioned document store backend.
///
/// Writes are upserts keyed by record id: writing a duplicate id silently
/// overwrites the previous record, so callers must not reuse
/// (doc_id, version, stage) triples. There is no update or delete operation —
/// corrections are new records with a higher version.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upsert one record keyed by its `id`.
  fn put<'a>(
    &'a self,
    record: &'a VersionedRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<VersionedRecord>, Self::Error>> + Send + 'a;

  /// Return all records matching `query`.
  fn query<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<VersionedRecord>, Self::Error>> + Send + 'a;

  /// Distinct doc_ids present in the store.
  fn list_docs(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
