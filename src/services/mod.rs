// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod moderation;
pub mod stats;

pub use moderation::ModerationService;
pub use stats::{
    compute_aggregate_stats, compute_personal_stats, fetch_aggregate_stats,
    fetch_personal_stats, FetchPolicy,
};
