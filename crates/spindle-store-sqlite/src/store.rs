//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use spindle_core::{
  record::VersionedRecord,
  store::{RecordQuery, RecordStore},
};

use crate::{
  Result,
  encode::{RawRecord, encode_dt, encode_stage},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Spindle record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The intended
/// shape is one store per process lifetime, constructed once and passed into
/// every operation. The connection serialises concurrent statements at the
/// storage layer; nothing above it adds mutual exclusion.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

const SELECT_COLUMNS: &str =
  "record_id, doc_id, version, stage, document, timestamp, is_final";

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    record_id: row.get(0)?,
    doc_id:    row.get(1)?,
    version:   row.get(2)?,
    stage:     row.get(3)?,
    document:  row.get(4)?,
    timestamp: row.get(5)?,
    is_final:  row.get(6)?,
  })
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn put(&self, record: &VersionedRecord) -> Result<()> {
    let id        = record.id.clone();
    let doc_id    = record.doc_id.clone();
    let version   = record.version;
    let stage     = encode_stage(&record.stage).to_owned();
    let document  = record.text.clone();
    let timestamp = encode_dt(record.timestamp);
    let is_final  = record.is_final;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records
             (record_id, doc_id, version, stage, document, timestamp, is_final)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(record_id) DO UPDATE SET
             doc_id    = excluded.doc_id,
             version   = excluded.version,
             stage     = excluded.stage,
             document  = excluded.document,
             timestamp = excluded.timestamp,
             is_final  = excluded.is_final",
          rusqlite::params![id, doc_id, version, stage, document, timestamp, is_final],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get(&self, id: &str) -> Result<Option<VersionedRecord>> {
    let id = id.to_owned();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SELECT_COLUMNS} FROM records WHERE record_id = ?1"),
              rusqlite::params![id],
              row_to_raw,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn query(&self, query: &RecordQuery) -> Result<Vec<VersionedRecord>> {
    let doc_id   = query.doc_id.clone();
    let stage    = query.stage.as_ref().map(|s| s.as_token().to_owned());
    let is_final = query.is_final;
    // SQLite treats a negative LIMIT as "no limit".
    let limit = query.limit.map(|n| n as i64).unwrap_or(-1);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        // Build the WHERE clause dynamically; LIMIT ?4 keeps the statement's
        // parameter count stable regardless of which filters are present.
        let mut conds: Vec<&'static str> = vec![];
        if doc_id.is_some() {
          conds.push("doc_id = ?1");
        }
        if stage.is_some() {
          conds.push("stage = ?2");
        }
        if is_final.is_some() {
          conds.push("is_final = ?3");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {SELECT_COLUMNS} FROM records {where_clause}
           ORDER BY doc_id, version LIMIT ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              doc_id.as_deref(),
              stage.as_deref(),
              is_final,
              limit,
            ],
            row_to_raw,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn list_docs(&self) -> Result<Vec<String>> {
    let docs: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT DISTINCT doc_id FROM records ORDER BY doc_id")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(docs)
  }
}
