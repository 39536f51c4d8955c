//! Integration tests for `SqliteStore` against an in-memory database,
//! exercising the versioning operations end to end.

use spindle_core::{
  Error as CoreError,
  artifact::DirArtifacts,
  record::{Stage, StageDraft},
  store::{RecordQuery, RecordStore},
  versioning::{get_final, next_version, save_initial_versions, save_stage},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn draft(doc_id: &str, version: i64, stage: Stage, text: &str) -> StageDraft {
  StageDraft::new(doc_id, version, stage, text)
}

/// A temp artifact directory holding `{name}.txt` files. The `TempDir` must
/// stay alive for the duration of the test.
fn artifact_dir(files: &[(&str, &str)]) -> (tempfile::TempDir, DirArtifacts) {
  let dir = tempfile::tempdir().expect("tempdir");
  for (name, text) in files {
    std::fs::write(dir.path().join(format!("{name}.txt")), text)
      .expect("write artifact");
  }
  let artifacts = DirArtifacts::new(dir.path());
  (dir, artifacts)
}

// ─── Version allocation ──────────────────────────────────────────────────────

#[tokio::test]
async fn next_version_starts_at_one() {
  let s = store().await;
  assert_eq!(next_version(&s, "ch1").await.unwrap(), 1);
}

#[tokio::test]
async fn next_version_is_max_plus_one() {
  let s = store().await;
  save_stage(&s, draft("ch1", 1, Stage::Og, "a")).await.unwrap();
  save_stage(&s, draft("ch1", 2, Stage::Spun, "b")).await.unwrap();
  // A gap is fine — allocation is max + 1, not count + 1.
  save_stage(&s, draft("ch1", 5, Stage::HumanEdited, "c"))
    .await
    .unwrap();

  assert_eq!(next_version(&s, "ch1").await.unwrap(), 6);
}

#[tokio::test]
async fn next_version_ignores_other_docs() {
  let s = store().await;
  save_stage(&s, draft("a", 1, Stage::Og, "x")).await.unwrap();
  save_stage(&s, draft("a", 2, Stage::Spun, "y")).await.unwrap();

  assert_eq!(next_version(&s, "b").await.unwrap(), 1);
}

#[tokio::test]
async fn next_version_rejects_empty_doc_id() {
  let s = store().await;
  let err = next_version(&s, "").await.unwrap_err();
  assert!(matches!(err, CoreError::EmptyDocId));
}

// ─── Stage recording ─────────────────────────────────────────────────────────

#[tokio::test]
async fn save_stage_persists_with_derived_id() {
  let s = store().await;
  let record = save_stage(&s, draft("chapter1", 3, Stage::HumanEdited, "edited"))
    .await
    .unwrap();

  assert_eq!(record.id, "chapter1_v3_human_edited");
  assert!(!record.is_final);

  let fetched = s.get("chapter1_v3_human_edited").await.unwrap().unwrap();
  assert_eq!(fetched.doc_id, "chapter1");
  assert_eq!(fetched.version, 3);
  assert_eq!(fetched.stage, Stage::HumanEdited);
  assert_eq!(fetched.text, "edited");
  assert_eq!(fetched.timestamp, record.timestamp);
}

#[tokio::test]
async fn save_stage_is_retrievable_by_doc_filter() {
  let s = store().await;
  save_stage(&s, draft("ch1", 1, Stage::Og, "raw")).await.unwrap();

  let records = s.query(&RecordQuery::for_doc("ch1")).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].id, "ch1_v1_og");
}

#[tokio::test]
async fn duplicate_id_overwrites_last_write_wins() {
  let s = store().await;
  save_stage(&s, draft("ch1", 1, Stage::Og, "first")).await.unwrap();
  save_stage(&s, draft("ch1", 1, Stage::Og, "second")).await.unwrap();

  let fetched = s.get("ch1_v1_og").await.unwrap().unwrap();
  assert_eq!(fetched.text, "second");

  // Still a single record, not two.
  let records = s.query(&RecordQuery::for_doc("ch1")).await.unwrap();
  assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn save_stage_accepts_empty_text() {
  let s = store().await;
  let record = save_stage(&s, draft("ch1", 1, Stage::Og, "")).await.unwrap();
  let fetched = s.get(&record.id).await.unwrap().unwrap();
  assert_eq!(fetched.text, "");
}

#[tokio::test]
async fn save_stage_validates_inputs() {
  let s = store().await;

  let err = save_stage(&s, draft("", 1, Stage::Og, "x")).await.unwrap_err();
  assert!(matches!(err, CoreError::EmptyDocId));

  let err = save_stage(&s, draft("ch1", 0, Stage::Og, "x")).await.unwrap_err();
  assert!(matches!(err, CoreError::NonPositiveVersion(0)));

  let err = save_stage(&s, draft("ch1", 1, Stage::Custom(String::new()), "x"))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::EmptyStage));
}

#[tokio::test]
async fn custom_stage_round_trips_as_token() {
  let s = store().await;
  let record = save_stage(&s, draft("ch1", 1, Stage::Custom("proofread".into()), "p"))
    .await
    .unwrap();

  assert_eq!(record.id, "ch1_v1_proofread");
  let fetched = s.get(&record.id).await.unwrap().unwrap();
  assert_eq!(fetched.stage, Stage::Custom("proofread".into()));
}

// ─── Final resolution ────────────────────────────────────────────────────────

#[tokio::test]
async fn get_final_picks_the_final_record() {
  let s = store().await;
  save_stage(&s, draft("A", 1, Stage::Og, "v1")).await.unwrap();
  save_stage(&s, draft("A", 2, Stage::Spun, "v2").finalized())
    .await
    .unwrap();
  save_stage(&s, draft("A", 3, Stage::Reviewed, "v3")).await.unwrap();

  let record = get_final(&s, "A").await.unwrap().unwrap();
  assert_eq!(record.version, 2);
  assert_eq!(record.text, "v2");
}

#[tokio::test]
async fn get_final_highest_version_wins_among_finals() {
  let s = store().await;
  save_stage(&s, draft("A", 2, Stage::Reviewed, "old").finalized())
    .await
    .unwrap();
  save_stage(&s, draft("A", 4, Stage::Rereviewed, "new").finalized())
    .await
    .unwrap();

  let record = get_final(&s, "A").await.unwrap().unwrap();
  assert_eq!(record.version, 4);
  assert_eq!(record.text, "new");
}

#[tokio::test]
async fn get_final_unknown_doc_is_none_not_an_error() {
  let s = store().await;
  assert!(get_final(&s, "unknown_doc").await.unwrap().is_none());
}

#[tokio::test]
async fn get_final_ignores_other_docs_finals() {
  let s = store().await;
  save_stage(&s, draft("B", 1, Stage::Reviewed, "other").finalized())
    .await
    .unwrap();

  assert!(get_final(&s, "A").await.unwrap().is_none());
}

// ─── Initial ingest ──────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_writes_three_canonical_records() {
  let s = store().await;
  let (_dir, artifacts) = artifact_dir(&[
    ("ch1", "RAW"),
    ("ch1_spun", "SPUN"),
    ("ch1_reviewed", "REVIEWED"),
  ]);

  let records = save_initial_versions(&s, &artifacts, "ch1").await.unwrap();
  assert_eq!(records.len(), 3);

  for (id, text) in [
    ("ch1_v1_og", "RAW"),
    ("ch1_v2_spun", "SPUN"),
    ("ch1_v3_reviewed", "REVIEWED"),
  ] {
    let record = s.get(id).await.unwrap().unwrap();
    assert_eq!(record.text, text);
    assert!(!record.is_final);
  }

  // Exactly three records for the doc, nothing else.
  let all = s.query(&RecordQuery::for_doc("ch1")).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn ingest_missing_artifact_aborts_before_writing() {
  let s = store().await;
  // The rewrite artifact is absent.
  let (_dir, artifacts) = artifact_dir(&[("ch1", "RAW"), ("ch1_reviewed", "R")]);

  let err = save_initial_versions(&s, &artifacts, "ch1").await.unwrap_err();
  assert!(
    matches!(err, CoreError::MissingArtifact { ref name, .. } if name == "ch1_spun")
  );

  // All artifacts are read up front, so nothing was written.
  let all = s.query(&RecordQuery::for_doc("ch1")).await.unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn ingest_appends_after_existing_records() {
  let s = store().await;
  save_stage(&s, draft("ch1", 1, Stage::Og, "earlier")).await.unwrap();

  let (_dir, artifacts) = artifact_dir(&[
    ("ch1", "RAW"),
    ("ch1_spun", "SPUN"),
    ("ch1_reviewed", "REVIEWED"),
  ]);

  let records = save_initial_versions(&s, &artifacts, "ch1").await.unwrap();
  let versions: Vec<i64> = records.iter().map(|r| r.version).collect();
  assert_eq!(versions, vec![2, 3, 4]);

  // The pre-existing record was not overwritten.
  let earlier = s.get("ch1_v1_og").await.unwrap().unwrap();
  assert_eq!(earlier.text, "earlier");
}

// ─── Round-trip ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn unicode_text_round_trips_exactly() {
  let s = store().await;
  let text = "Der Anfang…\n\n« Chapitre deux » — §3\n\n終わり 🌊\n";

  save_stage(&s, draft("ch1", 1, Stage::Spun, text)).await.unwrap();

  let fetched = s.get("ch1_v1_spun").await.unwrap().unwrap();
  assert_eq!(fetched.text, text);
}

// ─── Store queries ───────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_id_returns_none() {
  let s = store().await;
  assert!(s.get("nope_v1_og").await.unwrap().is_none());
}

#[tokio::test]
async fn query_filters_by_stage_and_final_flag() {
  let s = store().await;
  save_stage(&s, draft("ch1", 1, Stage::Og, "a")).await.unwrap();
  save_stage(&s, draft("ch1", 2, Stage::Spun, "b")).await.unwrap();
  save_stage(&s, draft("ch1", 3, Stage::Spun, "c").finalized())
    .await
    .unwrap();

  let spun = s
    .query(&RecordQuery {
      doc_id: Some("ch1".into()),
      stage: Some(Stage::Spun),
      ..RecordQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(spun.len(), 2);

  let finals = s
    .query(&RecordQuery {
      doc_id: Some("ch1".into()),
      is_final: Some(true),
      ..RecordQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(finals.len(), 1);
  assert_eq!(finals[0].version, 3);
}

#[tokio::test]
async fn query_respects_limit() {
  let s = store().await;
  for v in 1..=5 {
    save_stage(&s, draft("ch1", v, Stage::Respun, "t")).await.unwrap();
  }

  let some = s
    .query(&RecordQuery {
      doc_id: Some("ch1".into()),
      limit: Some(2),
      ..RecordQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(some.len(), 2);
}

#[tokio::test]
async fn list_docs_is_distinct_and_sorted() {
  let s = store().await;
  save_stage(&s, draft("beta", 1, Stage::Og, "b")).await.unwrap();
  save_stage(&s, draft("alpha", 1, Stage::Og, "a")).await.unwrap();
  save_stage(&s, draft("alpha", 2, Stage::Spun, "a2")).await.unwrap();

  let docs = s.list_docs().await.unwrap();
  assert_eq!(docs, vec!["alpha".to_string(), "beta".to_string()]);
}

#[tokio::test]
async fn persists_across_reopen() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("spindle.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    save_stage(&s, draft("ch1", 1, Stage::Og, "kept").finalized())
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let record = get_final(&s, "ch1").await.unwrap().unwrap();
  assert_eq!(record.text, "kept");
}
