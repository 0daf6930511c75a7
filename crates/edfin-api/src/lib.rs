//! JSON HTTP API for the district finance panel.
//!
//! Exposes an axum [`Router`] backed by any
//! [`edfin_core::store::ArtifactStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", edfin_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod finance;
pub mod reference;

use std::sync::Arc;

use axum::{Router, routing::get};
use edfin_core::store::ArtifactStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ArtifactStore + 'static,
{
  Router::new()
    .route("/finance", get(finance::handler::<S>))
    .route("/variables", get(reference::variables))
    .route("/states", get(reference::states))
    .with_state(store)
}
