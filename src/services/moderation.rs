// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resort submission and moderation workflow.
//!
//! 1. A user submits a resort; it is stored pending and every admin is notified
//! 2. An admin approves it (visible to statistics and ski day logging) or
//!    declines it (record deleted)
//! 3. The submitter is notified of the decision
//!
//! Notification writes are best effort: a failed write is logged and the
//! moderation decision still stands.

use crate::db::{new_document_id, FirestoreDb};
use crate::error::{AppError, Result};
use crate::models::resort::{ModerationAction, ResortInput};
use crate::models::{Notification, NotificationType, ResortRecord};
use crate::time_utils::now_rfc3339;

const MAX_DECLINE_REASON_LEN: usize = 500;
const DEFAULT_DECLINE_REASON: &str = "Your resort submission did not meet our guidelines.";

/// Resort moderation backed by Firestore.
#[derive(Clone)]
pub struct ModerationService {
    db: FirestoreDb,
}

impl ModerationService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Store a user's submission as pending and notify admins.
    pub async fn submit_resort(&self, user_id: &str, input: ResortInput) -> Result<ResortRecord> {
        let now = now_rfc3339();
        let resort = input.into_record(new_document_id()?, user_id, &now)?;
        self.db.set_resort(&resort).await?;

        tracing::info!(
            user_id,
            resort_id = %resort.id,
            name = %resort.name,
            "Resort submitted for moderation"
        );

        match self.db.list_admin_ids().await {
            Ok(admin_ids) => {
                let notifications = submitted_notifications(&admin_ids, &resort, &now)?;
                self.deliver(&notifications).await;
            }
            Err(e) => {
                tracing::warn!(resort_id = %resort.id, error = %e, "Could not look up admins to notify");
            }
        }

        Ok(resort)
    }

    /// Approve a pending resort.
    pub async fn approve_resort(&self, resort_id: &str) -> Result<ResortRecord> {
        let resort = self
            .db
            .moderate_resort(resort_id, ModerationAction::Approve)
            .await?;
        tracing::info!(resort_id, name = %resort.name, "Resort approved");

        if let Some(notification) = approved_notification(&resort, &now_rfc3339())? {
            self.deliver(&[notification]).await;
        }

        Ok(resort)
    }

    /// Decline a pending resort, deleting it.
    ///
    /// `reason` is passed on to the submitter.
    pub async fn decline_resort(&self, resort_id: &str, reason: Option<&str>) -> Result<()> {
        let reason = decline_reason(reason)?;
        let resort = self
            .db
            .moderate_resort(resort_id, ModerationAction::Decline)
            .await?;
        tracing::info!(resort_id, name = %resort.name, "Resort declined and deleted");

        if let Some(notification) = declined_notification(&resort, &reason, &now_rfc3339())? {
            self.deliver(&[notification]).await;
        }

        Ok(())
    }

    async fn deliver(&self, notifications: &[Notification]) {
        if notifications.is_empty() {
            return;
        }
        if let Err(e) = self.db.batch_set_notifications(notifications).await {
            tracing::warn!(
                count = notifications.len(),
                error = %e,
                "Failed to deliver moderation notifications"
            );
        }
    }
}

/// Trim the admin's reason, falling back to a default when blank.
fn decline_reason(reason: Option<&str>) -> Result<String> {
    let reason = reason.map(str::trim).unwrap_or_default();
    if reason.is_empty() {
        return Ok(DEFAULT_DECLINE_REASON.to_string());
    }
    if reason.chars().count() > MAX_DECLINE_REASON_LEN {
        return Err(AppError::BadRequest(format!(
            "Decline message must be at most {} characters",
            MAX_DECLINE_REASON_LEN
        )));
    }
    Ok(reason.to_string())
}

fn submitted_notifications(
    admin_ids: &[String],
    resort: &ResortRecord,
    now: &str,
) -> Result<Vec<Notification>> {
    admin_ids
        .iter()
        .filter(|admin_id| resort.submitted_by.as_deref() != Some(admin_id.as_str()))
        .map(|admin_id| -> Result<Notification> {
            Ok(Notification::new(
                new_document_id()?,
                admin_id,
                NotificationType::ResortSubmitted,
                "New resort submission",
                format!("\"{}\" is waiting for review.", resort.name),
                Some(resort.id.as_str()),
                now,
            ))
        })
        .collect()
}

fn approved_notification(resort: &ResortRecord, now: &str) -> Result<Option<Notification>> {
    let Some(submitter) = resort.submitted_by.as_deref() else {
        return Ok(None);
    };
    Ok(Some(Notification::new(
        new_document_id()?,
        submitter,
        NotificationType::ResortApproved,
        "Resort approved",
        format!("\"{}\" has been approved and added to the directory.", resort.name),
        Some(resort.id.as_str()),
        now,
    )))
}

fn declined_notification(
    resort: &ResortRecord,
    reason: &str,
    now: &str,
) -> Result<Option<Notification>> {
    let Some(submitter) = resort.submitted_by.as_deref() else {
        return Ok(None);
    };
    // The resort no longer exists, so no resort_id reference.
    Ok(Some(Notification::new(
        new_document_id()?,
        submitter,
        NotificationType::ResortDeclined,
        format!("Resort \"{}\" declined", resort.name),
        reason,
        None,
        now,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(submitted_by: Option<&str>) -> ResortRecord {
        ResortRecord {
            id: "r1".to_string(),
            name: "Pyhä".to_string(),
            approved: false,
            location_country: Some("FI".to_string()),
            location_city: None,
            location_area: None,
            height_m: None,
            lifts: None,
            skislopes_km: None,
            submitted_by: submitted_by.map(str::to_string),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_decline_reason_defaults_when_blank() {
        assert_eq!(decline_reason(None).unwrap(), DEFAULT_DECLINE_REASON);
        assert_eq!(decline_reason(Some("   ")).unwrap(), DEFAULT_DECLINE_REASON);
        assert_eq!(decline_reason(Some(" Duplicate ")).unwrap(), "Duplicate");
    }

    #[test]
    fn test_decline_reason_too_long() {
        let long = "x".repeat(MAX_DECLINE_REASON_LEN + 1);
        assert!(matches!(
            decline_reason(Some(&long)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_submission_notifies_each_admin_except_submitter() {
        let admins = vec!["admin-1".to_string(), "admin-2".to_string()];
        let resort = pending(Some("admin-2"));

        let notifications = submitted_notifications(&admins, &resort, "now").unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, "admin-1");
        assert_eq!(notifications[0].kind, NotificationType::ResortSubmitted);
        assert_eq!(notifications[0].resort_id.as_deref(), Some("r1"));
        assert!(!notifications[0].read);
    }

    #[test]
    fn test_approval_notifies_submitter() {
        let n = approved_notification(&pending(Some("user-1")), "now")
            .unwrap()
            .unwrap();
        assert_eq!(n.user_id, "user-1");
        assert_eq!(n.kind, NotificationType::ResortApproved);
        assert!(n.message.contains("Pyhä"));
    }

    #[test]
    fn test_decline_carries_reason_without_resort_ref() {
        let n = declined_notification(&pending(Some("user-1")), "Duplicate", "now")
            .unwrap()
            .unwrap();
        assert_eq!(n.kind, NotificationType::ResortDeclined);
        assert_eq!(n.message, "Duplicate");
        assert_eq!(n.resort_id, None);
    }

    #[test]
    fn test_no_notification_without_submitter() {
        assert!(approved_notification(&pending(None), "now").unwrap().is_none());
        assert!(declined_notification(&pending(None), "x", "now")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_offline_approve_is_database_error() {
        let service = ModerationService::new(FirestoreDb::new_mock());
        let err = service.approve_resort("r1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_offline_decline_is_database_error() {
        let service = ModerationService::new(FirestoreDb::new_mock());
        let err = service.decline_resort("r1", Some("Duplicate")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    fn assert_send<T: Send>(_: T) {}

    // Handlers await these, so they must stay Send.
    #[test]
    fn test_moderation_futures_are_send() {
        let service = ModerationService::new(FirestoreDb::new_mock());
        let input = ResortInput {
            name: "Levi".to_string(),
            location_country: None,
            location_city: None,
            location_area: None,
            height_m: None,
            lifts: None,
            skislopes_km: None,
        };
        assert_send(service.submit_resort("user-1", input));
        assert_send(service.approve_resort("r1"));
        assert_send(service.decline_resort("r1", None));
        assert_send(service.deliver(&[]));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let service = ModerationService::new(FirestoreDb::new_mock());
        let n = approved_notification(&pending(Some("user-1")), "now")
            .unwrap()
            .unwrap();
        // Returns without error even though every write fails offline
        service.deliver(&[n]).await;
    }
}
