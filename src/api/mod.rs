//! HTTP surface: router assembly, shared state, and the response envelope.

pub mod admin;
pub mod auth;
pub mod complaints;
mod response;

pub use auth::AuthUser;
pub use response::Envelope;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::notify::Notifier;
use crate::store::ComplaintStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ComplaintStore>>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(store: ComplaintStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            notifier,
        }
    }
}

/// Build the full route tree. The `/admin` subtree is gated on the admin role
/// before any handler runs; everything else only needs an authenticated caller.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/", get(admin::list_complaints))
        .route("/{id}", put(admin::update_complaint))
        .route("/stats/dashboard", get(admin::dashboard_stats))
        .route_layer(middleware::from_fn(auth::admin_only));

    Router::new()
        .route("/complaints", post(complaints::submit).get(complaints::list_own))
        .route("/complaints/{id}", get(complaints::get_one))
        .nest("/admin", admin_routes)
        .with_state(state)
}

/// Run one notification on the blocking pool and log the outcome. Dispatch is
/// at-most-once: failures are logged, never retried, never surfaced.
pub(crate) async fn dispatch<F>(notifier: Arc<dyn Notifier>, send: F)
where
    F: FnOnce(&dyn Notifier) -> Result<()> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || send(notifier.as_ref())).await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "notification dispatch failed"),
        Err(e) => tracing::warn!(error = %e, "notification task panicked"),
    }
}
