//! JSON API routes.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::{info, instrument};

use crate::state::AppState;

/// Response of the cache revalidation endpoint.
#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub status: u16,
    pub message: &'static str,
    /// Unix time in milliseconds.
    pub now: i64,
}

/// Drop every cached catalog entry.
///
/// POST /api/revalidate
#[instrument(skip(state))]
pub async fn revalidate(State(state): State<AppState>) -> Json<RevalidateResponse> {
    state.catalog().revalidate();
    info!("Catalog cache cleared");

    Json(RevalidateResponse {
        status: 200,
        message: "Revalidated",
        now: chrono::Utc::now().timestamp_millis(),
    })
}
