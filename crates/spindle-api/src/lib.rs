//! JSON REST API for Spindle.
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`] plus an
//! [`ArtifactSource`] for initial ingest. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", spindle_api::api_router(state))
//! ```

pub mod docs;
pub mod error;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use spindle_core::{artifact::ArtifactSource, store::RecordStore};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, A> {
  pub store:     Arc<S>,
  pub artifacts: Arc<A>,
}

// Manual impl — `S` and `A` themselves need not be `Clone` behind the `Arc`s.
impl<S, A> Clone for ApiState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      artifacts: Arc::clone(&self.artifacts),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(state: ApiState<S, A>) -> Router<()>
where
  S: RecordStore + 'static,
  A: ArtifactSource + 'static,
{
  Router::new()
    // Records
    .route(
      "/records",
      get(records::list::<S, A>).post(records::create::<S, A>),
    )
    .route("/records/{id}", get(records::get_one::<S, A>))
    // Documents
    .route("/docs", get(docs::list::<S, A>))
    .route("/docs/{doc_id}/next-version", get(docs::next_version::<S, A>))
    .route("/docs/{doc_id}/final", get(docs::get_final::<S, A>))
    .route("/docs/{doc_id}/ingest", post(docs::ingest::<S, A>))
    .with_state(state)
}
