//! Statistics views derived from the resort directory and ski day log.
//!
//! Nothing here is persisted; every value is recomputed from a snapshot
//! by `services::stats`.

use crate::models::ski_day::SkiType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A resort and how many ski days reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VisitedResort {
    pub name: String,
    pub visits: u32,
}

/// Directory-wide and activity-wide counters for the public landing page.
///
/// `Default` is the all-zero value shown when the data store is unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Approved resorts
    pub total_resorts: u32,
    /// Distinct non-null countries among approved resorts
    pub total_countries: u32,
    /// Ski days logged by all users
    pub total_ski_days: u32,
    pub most_visited_resort: Option<VisitedResort>,
}

/// One user's dashboard summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStats {
    pub total_days: u32,
    pub total_hours: f64,
    /// Kilometers
    pub total_distance: f64,
    /// `None` when no day has a rating
    pub avg_rating: Option<f64>,
    pub unique_resorts: u32,
    /// Days per ski type; a day may count toward several types
    pub ski_type_counts: BTreeMap<SkiType, u32>,
    pub most_visited_resort: Option<VisitedResort>,
    pub days_in_last_365: u32,
}
