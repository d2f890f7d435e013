// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ski day log model for storage and API.

use crate::error::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_HOURS: f64 = 24.0;
const MAX_RATING: f64 = 5.0;
const MAX_NOTES_LEN: usize = 1000;

/// Skiing style logged for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum SkiType {
    Piste,
    Park,
    Freeride,
    Touring,
    Street,
}

impl SkiType {
    pub const ALL: [SkiType; 5] = [
        SkiType::Piste,
        SkiType::Park,
        SkiType::Freeride,
        SkiType::Touring,
        SkiType::Street,
    ];
}

/// Stored ski day record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkiDayRecord {
    /// Document ID
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Calendar date, no time component
    pub date: NaiveDate,
    #[serde(default)]
    pub resort_id: Option<String>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// 0..=5 in half steps
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ski_types: Option<Vec<SkiType>>,
}

/// One ski day submitted by the owner.
#[derive(Debug, Clone, Deserialize)]
pub struct SkiDayInput {
    pub date: NaiveDate,
    pub resort_id: String,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ski_types: Option<Vec<SkiType>>,
}

impl SkiDayInput {
    /// Check field ranges without touching the resort directory.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.resort_id.trim().is_empty() {
            return Err(AppError::BadRequest("resort_id is required".to_string()));
        }
        if let Some(hours) = self.hours {
            if !hours.is_finite() || !(0.0..=MAX_HOURS).contains(&hours) {
                return Err(AppError::BadRequest(format!(
                    "hours must be between 0 and {}",
                    MAX_HOURS
                )));
            }
        }
        if let Some(distance) = self.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(AppError::BadRequest(
                    "distance_km must be a non-negative number".to_string(),
                ));
            }
        }
        if let Some(rating) = self.rating {
            if !is_valid_rating(rating) {
                return Err(AppError::BadRequest(
                    "rating must be between 0 and 5 in steps of 0.5".to_string(),
                ));
            }
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(AppError::BadRequest(format!(
                    "notes must be at most {} characters",
                    MAX_NOTES_LEN
                )));
            }
        }
        Ok(())
    }

    pub fn into_record(self, id: String, user_id: &str) -> SkiDayRecord {
        let ski_types = self.ski_types.map(|mut types| {
            types.sort();
            types.dedup();
            types
        });

        SkiDayRecord {
            id,
            user_id: user_id.to_string(),
            date: self.date,
            resort_id: Some(self.resort_id.trim().to_string()),
            hours: self.hours,
            distance_km: self.distance_km,
            rating: self.rating,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            ski_types: ski_types.filter(|t| !t.is_empty()),
        }
    }
}

fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) && (rating * 2.0).fract() == 0.0
}

/// Ski day as returned to its owner, with the resort name resolved.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SkiDaySummary {
    pub id: String,
    pub date: String,
    pub hours: Option<f64>,
    pub distance_km: Option<f64>,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    pub ski_types: Vec<SkiType>,
    pub resort: Option<ResortRef>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResortRef {
    pub id: String,
    pub name: String,
}
