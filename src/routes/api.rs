// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::{new_document_id, SkiDayFilter};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::profile::ProfileInput;
use crate::models::resort::{ResortInput, ResortSummary};
use crate::models::ski_day::{ResortRef, SkiDayInput, SkiDaySummary};
use crate::models::{Notification, PersonalStats, Profile, SkiDayRecord};
use crate::routes::validate_document_id;
use crate::services::fetch_personal_stats;
use crate::time_utils::{now_rfc3339, today_utc};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_SKI_DAYS_PER_REQUEST: usize = 100;
const DEFAULT_NOTIFICATION_LIMIT: u32 = 10;
const MAX_NOTIFICATION_LIMIT: u32 = 50;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/stats/me", get(get_personal_stats))
        .route("/api/resorts", post(submit_resort))
        .route("/api/ski-days", get(list_ski_days).post(create_ski_days))
        .route("/api/ski-days/{id}", delete(delete_ski_day))
        .route(
            "/api/notifications",
            get(list_notifications).delete(delete_all_notifications),
        )
        .route(
            "/api/notifications/unread-count",
            get(get_unread_notification_count),
        )
        .route(
            "/api/notifications/read-all",
            post(mark_all_notifications_read),
        )
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .route("/api/notifications/{id}", delete(delete_notification))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub admin: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
            admin: p.admin,
        }
    }
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    Ok(Json(profile.into()))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ProfileResponse>> {
    // Fetch-modify-write so the admin flag and created_at survive
    let existing = state.db.get_profile(&user.user_id).await?;
    let profile = input.apply(existing, &user.user_id, &now_rfc3339())?;
    state.db.upsert_profile(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Profile updated");
    Ok(Json(profile.into()))
}

// ─── Personal Stats ──────────────────────────────────────────

/// Dashboard summary for the current user. Zeroed if the data store is
/// unavailable.
async fn get_personal_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<PersonalStats> {
    Json(fetch_personal_stats(&state.db, &user.user_id, today_utc(), &state.stats_policy).await)
}

// ─── Resort Submission ───────────────────────────────────────

async fn submit_resort(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ResortInput>,
) -> Result<(StatusCode, Json<ResortSummary>)> {
    let resort = state.moderation.submit_resort(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(resort.into())))
}

// ─── Ski Days ────────────────────────────────────────────────

/// The user's ski days, newest first, with resort names resolved.
async fn list_ski_days(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<SkiDaySummary>>> {
    let filter = SkiDayFilter::User(user.user_id.clone());
    let (days, resorts) = tokio::try_join!(
        state.db.query_ski_days(&filter),
        state.db.list_all_resorts(),
    )?;

    let names: HashMap<String, String> = resorts.into_iter().map(|r| (r.id, r.name)).collect();

    let summaries = days
        .into_iter()
        .map(|d| SkiDaySummary {
            resort: d.resort_id.as_ref().and_then(|id| {
                names.get(id).map(|name| ResortRef {
                    id: id.clone(),
                    name: name.clone(),
                })
            }),
            id: d.id,
            date: d.date.to_string(),
            hours: d.hours,
            distance_km: d.distance_km,
            rating: d.rating,
            notes: d.notes,
            ski_types: d.ski_types.unwrap_or_default(),
        })
        .collect();

    Ok(Json(summaries))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateSkiDaysResponse {
    pub created: u32,
    pub ids: Vec<String>,
}

/// Log one or more ski days (multi-date picker).
///
/// The whole batch is validated before anything is written; each day must
/// reference an approved resort.
async fn create_ski_days(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(inputs): Json<Vec<SkiDayInput>>,
) -> Result<(StatusCode, Json<CreateSkiDaysResponse>)> {
    if inputs.is_empty() || inputs.len() > MAX_SKI_DAYS_PER_REQUEST {
        return Err(AppError::BadRequest(format!(
            "Submit between 1 and {} ski days",
            MAX_SKI_DAYS_PER_REQUEST
        )));
    }
    for input in &inputs {
        input.validate()?;
    }

    let approved: HashSet<String> = state
        .db
        .list_approved_resorts()
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();

    if let Some(bad) = inputs
        .iter()
        .find(|i| !approved.contains(i.resort_id.trim()))
    {
        return Err(AppError::BadRequest(format!(
            "Unknown or unapproved resort: {}",
            bad.resort_id
        )));
    }

    let records = inputs
        .into_iter()
        .map(|input| -> Result<SkiDayRecord> {
            Ok(input.into_record(new_document_id()?, &user.user_id))
        })
        .collect::<Result<Vec<_>>>()?;

    state.db.batch_set_ski_days(&records).await?;

    tracing::info!(user_id = %user.user_id, count = records.len(), "Ski days logged");

    Ok((
        StatusCode::CREATED,
        Json(CreateSkiDaysResponse {
            created: records.len() as u32,
            ids: records.into_iter().map(|r| r.id).collect(),
        }),
    ))
}

/// Delete one of the user's ski days. Other users' days look like missing ones.
async fn delete_ski_day(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    validate_document_id(&id)?;

    match state.db.get_ski_day(&id).await? {
        Some(day) if day.user_id == user.user_id => {
            state.db.delete_ski_day(&id).await?;
            tracing::info!(user_id = %user.user_id, ski_day_id = %id, "Ski day deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        _ => Err(AppError::NotFound(format!("Ski day {} not found", id))),
    }
}

// ─── Notifications ───────────────────────────────────────────

#[derive(Deserialize)]
struct NotificationsQuery {
    #[serde(default = "default_notification_limit")]
    limit: u32,
}

fn default_notification_limit() -> u32 {
    DEFAULT_NOTIFICATION_LIMIT
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>> {
    if params.limit == 0 {
        return Err(AppError::BadRequest(
            "limit must be greater than 0".to_string(),
        ));
    }
    let limit = params.limit.min(MAX_NOTIFICATION_LIMIT);

    let notifications = state.db.list_notifications(&user.user_id, limit).await?;
    Ok(Json(notifications))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CountResponse {
    pub count: u32,
}

async fn get_unread_notification_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CountResponse>> {
    let count = state.db.count_unread_notifications(&user.user_id).await?;
    Ok(Json(CountResponse { count }))
}

async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    validate_document_id(&id)?;

    if state.db.mark_notification_read(&user.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {} not found", id)))
    }
}

async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CountResponse>> {
    let count = state.db.mark_all_notifications_read(&user.user_id).await?;
    Ok(Json(CountResponse {
        count: count as u32,
    }))
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    validate_document_id(&id)?;

    if state.db.delete_notification(&user.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {} not found", id)))
    }
}

async fn delete_all_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CountResponse>> {
    let count = state.db.delete_all_notifications(&user.user_id).await?;
    Ok(Json(CountResponse {
        count: count as u32,
    }))
}
