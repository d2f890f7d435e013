// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resort directory model and moderation state.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_NAME_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 100;

/// Stored resort record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResortRecord {
    /// Document ID
    pub id: String,
    pub name: String,
    /// `false` while the submission awaits moderation
    pub approved: bool,
    #[serde(default)]
    pub location_country: Option<String>,
    #[serde(default)]
    pub location_city: Option<String>,
    #[serde(default)]
    pub location_area: Option<String>,
    /// Summit height in meters
    #[serde(default)]
    pub height_m: Option<u32>,
    #[serde(default)]
    pub lifts: Option<u32>,
    #[serde(default)]
    pub skislopes_km: Option<f64>,
    /// User who submitted the resort (receives moderation notifications)
    #[serde(default)]
    pub submitted_by: Option<String>,
    /// Submission time (RFC3339)
    #[serde(default)]
    pub created_at: String,
}

impl ResortRecord {
    pub fn status(&self) -> ResortStatus {
        if self.approved {
            ResortStatus::Approved
        } else {
            ResortStatus::Pending
        }
    }
}

/// Moderation state of a resort. Declined resorts are deleted, so they
/// have no state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResortStatus {
    Pending,
    Approved,
}

/// Admin action on a resort submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Decline,
}

/// Result of a valid moderation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationOutcome {
    /// Record stays, now visible to statistics and ski-day logging
    Approved,
    /// Record is removed
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModerationError {
    #[error("Resort is already approved")]
    AlreadyApproved,
}

impl From<ModerationError> for AppError {
    fn from(err: ModerationError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

impl ResortStatus {
    /// Apply an admin action. `Approved` is terminal.
    pub fn transition(self, action: ModerationAction) -> Result<ModerationOutcome, ModerationError> {
        match (self, action) {
            (ResortStatus::Pending, ModerationAction::Approve) => Ok(ModerationOutcome::Approved),
            (ResortStatus::Pending, ModerationAction::Decline) => Ok(ModerationOutcome::Deleted),
            (ResortStatus::Approved, _) => Err(ModerationError::AlreadyApproved),
        }
    }
}

/// Resort submission from a user.
#[derive(Debug, Clone, Deserialize)]
pub struct ResortInput {
    pub name: String,
    #[serde(default)]
    pub location_country: Option<String>,
    #[serde(default)]
    pub location_city: Option<String>,
    #[serde(default)]
    pub location_area: Option<String>,
    #[serde(default)]
    pub height_m: Option<u32>,
    #[serde(default)]
    pub lifts: Option<u32>,
    #[serde(default)]
    pub skislopes_km: Option<f64>,
}

impl ResortInput {
    /// Validate and build a pending record.
    ///
    /// The name is trimmed. Location strings are stored as entered apart
    /// from dropping blank values, so country grouping sees the raw text.
    pub fn into_record(
        self,
        id: String,
        submitted_by: &str,
        now: &str,
    ) -> Result<ResortRecord, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Resort name is required".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "Resort name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }
        if let Some(km) = self.skislopes_km {
            if !km.is_finite() || km < 0.0 {
                return Err(AppError::BadRequest(
                    "skislopes_km must be a non-negative number".to_string(),
                ));
            }
        }

        Ok(ResortRecord {
            id,
            name: name.to_string(),
            approved: false,
            location_country: non_blank(self.location_country)?,
            location_city: non_blank(self.location_city)?,
            location_area: non_blank(self.location_area)?,
            height_m: self.height_m,
            lifts: self.lifts,
            skislopes_km: self.skislopes_km,
            submitted_by: Some(submitted_by.to_string()),
            created_at: now.to_string(),
        })
    }
}

fn non_blank(value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) if v.chars().count() > MAX_LOCATION_LEN => Err(AppError::BadRequest(format!(
            "Location fields must be at most {} characters",
            MAX_LOCATION_LEN
        ))),
        other => Ok(other),
    }
}

/// Resort as shown in the public directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResortSummary {
    pub id: String,
    pub name: String,
    pub location_country: Option<String>,
    pub location_city: Option<String>,
    pub location_area: Option<String>,
    pub height_m: Option<u32>,
    pub lifts: Option<u32>,
    pub skislopes_km: Option<f64>,
}

impl From<ResortRecord> for ResortSummary {
    fn from(r: ResortRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            location_country: r.location_country,
            location_city: r.location_city,
            location_area: r.location_area,
            height_m: r.height_m,
            lifts: r.lifts,
            skislopes_km: r.skislopes_km,
        }
    }
}
