// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public routes: landing page statistics and the resort directory.

use crate::error::Result;
use crate::models::resort::ResortSummary;
use crate::models::AggregateStats;
use crate::services::fetch_aggregate_stats;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stats/aggregate", get(get_aggregate_stats))
        .route("/api/resorts", get(list_resorts))
}

/// Site-wide counters.
///
/// Always 200: if the data store cannot be read the counters are zero.
async fn get_aggregate_stats(State(state): State<Arc<AppState>>) -> Json<AggregateStats> {
    Json(fetch_aggregate_stats(&state.db, &state.stats_policy).await)
}

/// Approved resorts ordered by name.
async fn list_resorts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ResortSummary>>> {
    let resorts = state.db.list_approved_resorts().await?;
    tracing::debug!(count = resorts.len(), "Listing approved resorts");
    Ok(Json(resorts.into_iter().map(ResortSummary::from).collect()))
}
