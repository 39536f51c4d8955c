//! Handlers for `/records` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | Optional `doc_id`, `stage`, `is_final`, `limit` |
//! | `GET`  | `/records/:id` | Single record; 404 when absent |
//! | `POST` | `/records` | Body: [`NewRecordBody`]; returns 201 + stored record |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use spindle_core::{
  artifact::ArtifactSource,
  record::{Stage, StageDraft, VersionedRecord},
  store::{RecordQuery, RecordStore},
  versioning,
};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub doc_id:   Option<String>,
  pub stage:    Option<Stage>,
  pub is_final: Option<bool>,
  pub limit:    Option<usize>,
}

/// `GET /records[?doc_id=...][&stage=...][&is_final=true][&limit=...]`
pub async fn list<S, A>(
  State(state): State<ApiState<S, A>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<VersionedRecord>>, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let query = RecordQuery {
    doc_id:   params.doc_id,
    stage:    params.stage,
    is_final: params.is_final,
    limit:    params.limit,
  };

  let records = state
    .store
    .query(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/:id`
pub async fn get_one<S, A>(
  State(state): State<ApiState<S, A>>,
  Path(id): Path<String>,
) -> Result<Json<VersionedRecord>, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let record = state
    .store
    .get(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(record))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /records`.
///
/// `version` may be omitted, in which case the next version for `doc_id` is
/// allocated before recording. `id` and `timestamp` are never accepted — the
/// recorder derives both.
#[derive(Debug, Deserialize)]
pub struct NewRecordBody {
  pub doc_id:   String,
  pub stage:    Stage,
  #[serde(default)]
  pub text:     String,
  pub version:  Option<i64>,
  #[serde(default)]
  pub is_final: bool,
}

/// `POST /records` — returns 201 + the stored [`VersionedRecord`].
pub async fn create<S, A>(
  State(state): State<ApiState<S, A>>,
  Json(body): Json<NewRecordBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  A: ArtifactSource,
{
  let version = match body.version {
    Some(v) => v,
    None => versioning::next_version(&*state.store, &body.doc_id)
      .await
      .map_err(ApiError::from_core)?,
  };

  let draft = StageDraft {
    doc_id:   body.doc_id,
    version,
    stage:    body.stage,
    text:     body.text,
    is_final: body.is_final,
  };

  let record = versioning::save_stage(&*state.store, draft)
    .await
    .map_err(ApiError::from_core)?;
  Ok((StatusCode::CREATED, Json(record)))
}
