// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ski Tracker: log ski days and explore a shared resort directory
//!
//! This crate provides the backend API for the ski day log, the resort
//! directory with its moderation queue, and the statistics shown on the
//! landing page and personal dashboards.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{FetchPolicy, ModerationService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub moderation: ModerationService,
    pub stats_policy: FetchPolicy,
}

impl AppState {
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let stats_policy = FetchPolicy::from(&config);
        Self {
            moderation: ModerationService::new(db.clone()),
            stats_policy,
            config,
            db,
        }
    }
}
