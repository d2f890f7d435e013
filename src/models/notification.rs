// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-app notifications produced by resort moderation.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ResortApproved,
    ResortDeclined,
    ResortSubmitted,
}

/// Stored notification in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Notification {
    pub id: String,
    /// Recipient
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub resort_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    /// RFC3339, used for newest-first ordering
    pub created_at: String,
}

impl Notification {
    pub fn new(
        id: String,
        user_id: &str,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        resort_id: Option<&str>,
        created_at: &str,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            resort_id: resort_id.map(str::to_string),
            read: false,
            created_at: created_at.to_string(),
        }
    }
}
