//! Reading pipeline artifacts — the text files the scraper and generators
//! leave behind before ingest.
//!
//! Initial ingest reads artifacts by naming convention: the original scrape
//! under the bare doc_id, the rewrite under `{doc_id}_spun`, and the review
//! under `{doc_id}_reviewed`.

use std::{future::Future, path::PathBuf};

/// A named, file-like source of pipeline text artifacts.
pub trait ArtifactSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the full text of the artifact called `name`.
  fn read<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

// ─── Filesystem implementation ───────────────────────────────────────────────

/// Artifacts stored as `{name}.txt` files under a single directory.
#[derive(Debug, Clone)]
pub struct DirArtifacts {
  root: PathBuf,
}

impl DirArtifacts {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// The on-disk path for an artifact name.
  pub fn path_for(&self, name: &str) -> PathBuf {
    self.root.join(format!("{name}.txt"))
  }
}

impl ArtifactSource for DirArtifacts {
  type Error = std::io::Error;

  async fn read(&self, name: &str) -> Result<String, Self::Error> {
    tokio::fs::read_to_string(self.path_for(name)).await
  }
}
