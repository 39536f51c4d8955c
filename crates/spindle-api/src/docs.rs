//! Handlers for per-document operations.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/docs` | Distinct doc_ids |
//! | `GET`  | `/docs/:doc_id/next-version` | Version the next record should use |
//! | `GET`  | `/docs/:doc_id/final` | Highest-versioned final record; 404 when none |
//! | `POST` | `/docs/:doc_id/ingest` | Bootstrap og/spun/reviewed from artifacts |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use spindle_core::{
  artifact::ArtifactSource, record::VersionedRecord, store::RecordStore, versioning,
};

use crate::{ApiState, error::ApiError};

/// `GET /docs`
pub async fn list<S, A>(
  State(state): State<ApiState<S, A>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let docs = state
    .store
    .list_docs()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(docs))
}

/// `GET /docs/:doc_id/next-version`
pub async fn next_version<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let next = versioning::next_version(&*state.store, &doc_id)
    .await
    .map_err(ApiError::from_core)?;
  Ok(Json(json!({ "doc_id": doc_id, "next_version": next })))
}

/// `GET /docs/:doc_id/final`
///
/// An absent final record is a normal outcome for the subsystem; it maps to
/// 404 here so HTTP callers can branch on status.
pub async fn get_final<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(doc_id): Path<String>,
) -> Result<Json<VersionedRecord>, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let record = versioning::get_final(&*state.store, &doc_id)
    .await
    .map_err(ApiError::from_core)?
    .ok_or_else(|| ApiError::NotFound(format!("no final record for {doc_id}")))?;
  Ok(Json(record))
}

/// `POST /docs/:doc_id/ingest` — returns 201 + the three canonical records.
pub async fn ingest<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(doc_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let records =
    versioning::save_initial_versions(&*state.store, &*state.artifacts, &doc_id)
      .await
      .map_err(ApiError::from_core)?;
  Ok((StatusCode::CREATED, Json(records)))
}
