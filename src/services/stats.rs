// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics over the resort directory and ski day log.
//!
//! The `compute_*` functions are pure reductions over a snapshot. The
//! `fetch_*` wrappers read the snapshot through a [`StatsSource`] and never
//! fail: a query that still errors after the retry budget yields the
//! zero-valued default so the dashboard keeps rendering.
//!
//! Resorts and ski days are read concurrently, not in one transaction. A
//! resort approved between the two reads can appear in one counter and not
//! another; this read skew is accepted.

use crate::config::Config;
use crate::db::{SkiDayFilter, StatsSource};
use crate::error::AppError;
use crate::models::{
    AggregateStats, PersonalStats, ResortRecord, SkiDayRecord, VisitedResort,
};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

const DAYS_PER_YEAR: u64 = 365;

/// Timeout and retry budget for statistics queries.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    /// Upper bound for one query attempt
    pub timeout: Duration,
    /// Total attempts per query, at least 1
    pub attempts: u32,
    /// Pause before each retry
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
            backoff: Duration::from_millis(100),
        }
    }
}

impl From<&Config> for FetchPolicy {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.stats_fetch_timeout,
            attempts: config.stats_fetch_attempts,
            ..Self::default()
        }
    }
}

// ─── Pure Reducers ───────────────────────────────────────────

/// Compute the public counters from full resort and ski day snapshots.
///
/// The most visited resort is the `resort_id` referenced by the most ski
/// days; ties go to the lexicographically lowest id. Its name comes from
/// `resorts` whatever the approval state, and it is `None` when the id is
/// missing from the snapshot.
pub fn compute_aggregate_stats(
    resorts: &[ResortRecord],
    ski_days: &[SkiDayRecord],
) -> AggregateStats {
    let approved: Vec<&ResortRecord> = resorts.iter().filter(|r| r.approved).collect();

    // Raw string equality: "FI" and "fi" are different countries.
    let countries: HashSet<&str> = approved
        .iter()
        .filter_map(|r| r.location_country.as_deref())
        .collect();

    AggregateStats {
        total_resorts: approved.len() as u32,
        total_countries: countries.len() as u32,
        total_ski_days: ski_days.len() as u32,
        most_visited_resort: most_visited_resort(resorts, ski_days),
    }
}

/// Summarize one user's ski days.
///
/// Missing hours and distance count as zero; missing ratings are left out
/// of the average rather than counted as zero.
pub fn compute_personal_stats(
    ski_days: &[SkiDayRecord],
    resorts: &[ResortRecord],
    today: NaiveDate,
) -> PersonalStats {
    let total_hours: f64 = ski_days.iter().map(|d| d.hours.unwrap_or(0.0)).sum();
    let total_distance: f64 = ski_days.iter().map(|d| d.distance_km.unwrap_or(0.0)).sum();

    let ratings: Vec<f64> = ski_days.iter().filter_map(|d| d.rating).collect();
    let avg_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    let unique_resorts = ski_days
        .iter()
        .filter_map(|d| d.resort_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as u32;

    let mut ski_type_counts = BTreeMap::new();
    for day in ski_days {
        for ski_type in day.ski_types.iter().flatten() {
            *ski_type_counts.entry(*ski_type).or_insert(0) += 1;
        }
    }

    // The day exactly one year back is outside the window.
    let window_start = today
        .checked_sub_days(Days::new(DAYS_PER_YEAR))
        .unwrap_or(NaiveDate::MIN);
    let days_in_last_365 = ski_days
        .iter()
        .filter(|d| d.date > window_start && d.date <= today)
        .count() as u32;

    PersonalStats {
        total_days: ski_days.len() as u32,
        total_hours,
        total_distance,
        avg_rating,
        unique_resorts,
        ski_type_counts,
        most_visited_resort: most_visited_resort(resorts, ski_days),
        days_in_last_365,
    }
}

fn most_visited_resort(
    resorts: &[ResortRecord],
    ski_days: &[SkiDayRecord],
) -> Option<VisitedResort> {
    // BTreeMap iterates ids in order, so keeping the first strict maximum
    // makes the lowest id win a tie.
    let mut visits: BTreeMap<&str, u32> = BTreeMap::new();
    for resort_id in ski_days.iter().filter_map(|d| d.resort_id.as_deref()) {
        *visits.entry(resort_id).or_insert(0) += 1;
    }

    let mut best: Option<(&str, u32)> = None;
    for (id, count) in visits {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((id, count));
        }
    }

    let (id, visits) = best?;
    let names: HashMap<&str, &str> = resorts
        .iter()
        .map(|r| (r.id.as_str(), r.name.as_str()))
        .collect();

    names.get(id).map(|name| VisitedResort {
        name: name.to_string(),
        visits,
    })
}

// ─── Fail-Soft Fetching ──────────────────────────────────────

/// Read both collections and compute the public counters.
///
/// Any read failure yields `AggregateStats::default()`.
pub async fn fetch_aggregate_stats<S: StatsSource>(
    source: &S,
    policy: &FetchPolicy,
) -> AggregateStats {
    let snapshot = tokio::try_join!(
        fetch_with_retry("resorts", policy, || source.list_resorts()),
        fetch_with_retry("ski_days", policy, || source.list_ski_days(SkiDayFilter::All)),
    );

    match snapshot {
        Ok((resorts, ski_days)) => {
            let stats = compute_aggregate_stats(&resorts, &ski_days);
            tracing::debug!(
                total_resorts = stats.total_resorts,
                total_countries = stats.total_countries,
                total_ski_days = stats.total_ski_days,
                "Computed aggregate stats"
            );
            stats
        }
        Err(e) => {
            tracing::warn!(error = %e, "Aggregate stats unavailable, returning zeroed stats");
            AggregateStats::default()
        }
    }
}

/// Read one user's ski days plus the resort names and summarize them.
///
/// Any read failure yields `PersonalStats::default()`.
pub async fn fetch_personal_stats<S: StatsSource>(
    source: &S,
    user_id: &str,
    today: NaiveDate,
    policy: &FetchPolicy,
) -> PersonalStats {
    let snapshot = tokio::try_join!(
        fetch_with_retry("resorts", policy, || source.list_resorts()),
        fetch_with_retry("ski_days", policy, || {
            source.list_ski_days(SkiDayFilter::User(user_id.to_string()))
        }),
    );

    match snapshot {
        Ok((resorts, ski_days)) => compute_personal_stats(&ski_days, &resorts, today),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Personal stats unavailable, returning zeroed stats");
            PersonalStats::default()
        }
    }
}

/// Run a query with a per-attempt timeout, retrying up to `policy.attempts`.
async fn fetch_with_retry<T, F, Fut>(
    query: &'static str,
    policy: &FetchPolicy,
    mut run: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(policy.timeout, run()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Database(format!(
                "{} query timed out after {:?}",
                query, policy.timeout
            ))),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::debug!(query, attempt, error = %e, "Stats query failed, retrying");
                attempt += 1;
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
