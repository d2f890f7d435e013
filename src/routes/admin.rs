// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes for the resort moderation queue.
//!
//! Both `require_auth` and `require_admin` are applied in routes/mod.rs.

use crate::error::Result;
use crate::models::resort::ResortSummary;
use crate::models::ResortRecord;
use crate::routes::validate_document_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/resorts/pending", get(list_pending_resorts))
        .route("/api/admin/resorts/{id}/approve", post(approve_resort))
        .route("/api/admin/resorts/{id}/decline", post(decline_resort))
}

/// Pending resort with submission metadata.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PendingResort {
    #[serde(flatten)]
    pub resort: ResortSummary,
    pub submitted_by: Option<String>,
    pub created_at: String,
}

impl From<ResortRecord> for PendingResort {
    fn from(r: ResortRecord) -> Self {
        let submitted_by = r.submitted_by.clone();
        let created_at = r.created_at.clone();
        Self {
            resort: r.into(),
            submitted_by,
            created_at,
        }
    }
}

/// Oldest submissions first.
async fn list_pending_resorts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PendingResort>>> {
    let pending = state.db.list_pending_resorts().await?;
    tracing::debug!(count = pending.len(), "Listing pending resorts");
    Ok(Json(pending.into_iter().map(PendingResort::from).collect()))
}

async fn approve_resort(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResortSummary>> {
    validate_document_id(&id)?;
    let resort = state.moderation.approve_resort(&id).await?;
    Ok(Json(resort.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeclineRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Decline and delete a pending resort. The body is optional.
async fn decline_resort(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<DeclineRequest>>,
) -> Result<StatusCode> {
    validate_document_id(&id)?;
    let request = body.map(|Json(b)| b).unwrap_or_default();
    state
        .moderation
        .decline_resort(&id, request.message.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
