//! The four versioning operations: version allocation, stage recording,
//! initial ingest, and final resolution.
//!
//! Every operation takes the store handle explicitly — there is no ambient
//! connection. Within one process, a sequential allocate-then-record pair for
//! the same document is correct because nothing reads in between. The
//! subsystem adds no locking or transactions, so callers racing across
//! processes must serialise access themselves (single-writer assumption).

use chrono::Utc;

use crate::{
  Error, Result,
  artifact::ArtifactSource,
  record::{Stage, StageDraft, VersionedRecord, record_id},
  store::{RecordQuery, RecordStore},
};

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

// ─── Version allocation ──────────────────────────────────────────────────────

/// Next version number for `doc_id`: `1 + max(existing versions)`, or `1`
/// when the document has no records yet.
///
/// Read-only. The result is strictly greater than every version present at
/// query time; two callers racing this between their reads and writes can
/// both be handed the same number (see the module docs).
pub async fn next_version<S>(store: &S, doc_id: &str) -> Result<i64>
where
  S: RecordStore,
{
  if doc_id.is_empty() {
    return Err(Error::EmptyDocId);
  }

  let records = store
    .query(&RecordQuery::for_doc(doc_id))
    .await
    .map_err(store_err)?;

  let max = records.iter().map(|r| r.version).max().unwrap_or(0);
  Ok(max + 1)
}

// ─── Stage recording ─────────────────────────────────────────────────────────

/// Record one pipeline stage as a new immutable [`VersionedRecord`].
///
/// The id is derived from (doc_id, version, stage) and the timestamp is
/// stamped here; neither is accepted from the caller. Writing an id that
/// already exists overwrites the old record silently (store upsert
/// semantics). Empty `text` is accepted.
///
/// Store failures propagate unchanged; nothing is retried.
pub async fn save_stage<S>(store: &S, draft: StageDraft) -> Result<VersionedRecord>
where
  S: RecordStore,
{
  if draft.doc_id.is_empty() {
    return Err(Error::EmptyDocId);
  }
  if draft.stage.as_token().is_empty() {
    return Err(Error::EmptyStage);
  }
  if draft.version < 1 {
    return Err(Error::NonPositiveVersion(draft.version));
  }

  let record = VersionedRecord {
    id:        record_id(&draft.doc_id, draft.version, &draft.stage),
    doc_id:    draft.doc_id,
    version:   draft.version,
    stage:     draft.stage,
    text:      draft.text,
    timestamp: Utc::now(),
    is_final:  draft.is_final,
  };

  store.put(&record).await.map_err(store_err)?;
  Ok(record)
}

// ─── Initial ingest ──────────────────────────────────────────────────────────

/// Bootstrap the three canonical records for a freshly scraped document:
/// original scrape (`og`), AI rewrite (`spun`), and AI review (`reviewed`),
/// all with the final flag unset.
///
/// All three artifacts are read before anything is written, so a missing
/// artifact aborts the ingest with no store mutation. Versions are allocated
/// through [`next_version`] — a fresh document gets versions 1, 2, 3, and a
/// document with prior records appends after them instead of colliding.
/// There is no rollback: if a write fails partway, earlier records remain.
pub async fn save_initial_versions<S, A>(
  store:     &S,
  artifacts: &A,
  doc_id:    &str,
) -> Result<[VersionedRecord; 3]>
where
  S: RecordStore,
  A: ArtifactSource,
{
  if doc_id.is_empty() {
    return Err(Error::EmptyDocId);
  }

  let og_text = read_artifact(artifacts, doc_id, doc_id.to_owned()).await?;
  let spun_text = read_artifact(artifacts, doc_id, format!("{doc_id}_spun")).await?;
  let reviewed_text =
    read_artifact(artifacts, doc_id, format!("{doc_id}_reviewed")).await?;

  let og = ingest_one(store, doc_id, Stage::Og, og_text).await?;
  let spun = ingest_one(store, doc_id, Stage::Spun, spun_text).await?;
  let reviewed = ingest_one(store, doc_id, Stage::Reviewed, reviewed_text).await?;

  Ok([og, spun, reviewed])
}

async fn read_artifact<A>(artifacts: &A, doc_id: &str, name: String) -> Result<String>
where
  A: ArtifactSource,
{
  artifacts
    .read(&name)
    .await
    .map_err(|e| Error::MissingArtifact {
      doc_id: doc_id.to_owned(),
      name,
      source: Box::new(e),
    })
}

async fn ingest_one<S>(
  store:  &S,
  doc_id: &str,
  stage:  Stage,
  text:   String,
) -> Result<VersionedRecord>
where
  S: RecordStore,
{
  let version = next_version(store, doc_id).await?;
  save_stage(store, StageDraft::new(doc_id, version, stage, text)).await
}

// ─── Final resolution ────────────────────────────────────────────────────────

/// The authoritative record for `doc_id`: the highest-versioned record
/// flagged final. `None` when no record is flagged — a normal outcome, not a
/// fault; callers branch on emptiness.
///
/// Nothing enforces at-most-one final per document; when several exist the
/// highest version wins, and a tie across stages at the same version is
/// broken arbitrarily.
pub async fn get_final<S>(store: &S, doc_id: &str) -> Result<Option<VersionedRecord>>
where
  S: RecordStore,
{
  if doc_id.is_empty() {
    return Err(Error::EmptyDocId);
  }

  let finals = store
    .query(&RecordQuery {
      doc_id: Some(doc_id.to_owned()),
      is_final: Some(true),
      ..RecordQuery::default()
    })
    .await
    .map_err(store_err)?;

  Ok(finals.into_iter().max_by_key(|r| r.version))
}
