// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Resorts (directory and moderation queue)
//! - Ski days (per-user log)
//! - Notifications (moderation messages)
//! - Profiles (display name, admin flag)

use crate::db::{collections, SkiDayFilter, StatsSource};
use crate::error::AppError;
use crate::models::resort::{ModerationAction, ModerationOutcome};
use crate::models::{Notification, Profile, ResortRecord, SkiDayRecord};
use futures_util::{stream, StreamExt};
use std::future::Future;

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Resort Operations ───────────────────────────────────────

    /// Every resort, approved or pending.
    pub async fn list_all_resorts(&self) -> Result<Vec<ResortRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESORTS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved resorts ordered by name (public directory, ski day picker).
    pub async fn list_approved_resorts(&self) -> Result<Vec<ResortRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESORTS)
            .filter(|q| q.for_all([q.field("approved").eq(true)]))
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Submissions awaiting moderation, oldest first.
    pub async fn list_pending_resorts(&self) -> Result<Vec<ResortRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESORTS)
            .filter(|q| q.for_all([q.field("approved").eq(false)]))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_resort(&self, resort_id: &str) -> Result<Option<ResortRecord>, AppError> {
        read_resort(self.get_client()?, resort_id).await
    }

    /// Create or update a resort.
    pub async fn set_resort(&self, resort: &ResortRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RESORTS)
            .document_id(&resort.id)
            .object(resort)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply a moderation action atomically.
    ///
    /// The resort is read inside a Firestore transaction, checked against
    /// the state machine, then updated or deleted in the same transaction.
    /// A concurrent decision on the same resort makes the commit fail
    /// instead of overwriting it, so an approved resort is never deleted.
    ///
    /// Returns the resort as it stands after the action (for a decline, the
    /// record that was deleted).
    pub async fn moderate_resort(
        &self,
        resort_id: &str,
        action: ModerationAction,
    ) -> Result<ResortRecord, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this client are part of the transaction
        let tx_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let checked = match read_resort(&tx_client, resort_id).await {
            Ok(Some(resort)) => resort
                .status()
                .transition(action)
                .map(|outcome| (resort, outcome))
                .map_err(AppError::from),
            Ok(None) => Err(AppError::NotFound(format!("Resort {} not found", resort_id))),
            Err(e) => Err(e),
        };

        let (mut resort, outcome) = match checked {
            Ok(checked) => checked,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };

        match outcome {
            ModerationOutcome::Approved => {
                resort.approved = true;
                client
                    .fluent()
                    .update()
                    .in_col(collections::RESORTS)
                    .document_id(&resort.id)
                    .object(&resort)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add resort to transaction: {}", e))
                    })?;
            }
            ModerationOutcome::Deleted => {
                client
                    .fluent()
                    .delete()
                    .from(collections::RESORTS)
                    .document_id(&resort.id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add resort deletion to transaction: {}",
                            e
                        ))
                    })?;
            }
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(resort_id, ?outcome, "Moderation committed");
        Ok(resort)
    }

    // ─── Ski Day Operations ──────────────────────────────────────

    /// Ski days matching the filter. Per-user queries come back newest first.
    pub async fn query_ski_days(
        &self,
        filter: &SkiDayFilter,
    ) -> Result<Vec<SkiDayRecord>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SKI_DAYS);

        match filter {
            SkiDayFilter::All => query.obj::<SkiDayRecord>().query().await,
            SkiDayFilter::User(user_id) => {
                let user_id = user_id.clone();
                query
                    .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
                    .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
                    .obj::<SkiDayRecord>()
                    .query()
                    .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_ski_day(&self, ski_day_id: &str) -> Result<Option<SkiDayRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SKI_DAYS)
            .obj()
            .one(ski_day_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a batch of ski days. Each chunk commits as one transaction,
    /// so a batch under `BATCH_SIZE` is all-or-nothing.
    pub async fn batch_set_ski_days(&self, days: &[SkiDayRecord]) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in days.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for day in chunk {
                client
                    .fluent()
                    .update()
                    .in_col(collections::SKI_DAYS)
                    .document_id(&day.id)
                    .object(day)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add ski day to transaction: {}", e))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;
        }

        tracing::debug!(count = days.len(), "Stored ski days");
        Ok(())
    }

    pub async fn delete_ski_day(&self, ski_day_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SKI_DAYS)
            .document_id(ski_day_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Notification Operations ─────────────────────────────────

    /// Newest notifications for a user.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_unread_notifications(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("read").eq(false),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn count_unread_notifications(&self, user_id: &str) -> Result<u32, AppError> {
        Ok(self.list_unread_notifications(user_id).await?.len() as u32)
    }

    async fn get_notification(&self, notification_id: &str) -> Result<Option<Notification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATIONS)
            .obj()
            .one(notification_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_notification(&self, notification: &Notification) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store multiple notifications.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn batch_set_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<(), AppError> {
        stream::iter(notifications.iter().cloned())
            .map(|notification| async move { self.set_notification(&notification).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    /// Mark one of the user's notifications read.
    ///
    /// Returns `false` if it does not exist or belongs to someone else.
    pub async fn mark_notification_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> Result<bool, AppError> {
        match self.get_notification(notification_id).await? {
            Some(mut n) if n.user_id == user_id => {
                if !n.read {
                    n.read = true;
                    self.set_notification(&n).await?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Mark every unread notification of the user read. Returns how many changed.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<usize, AppError> {
        let mut unread = self.list_unread_notifications(user_id).await?;
        for n in &mut unread {
            n.read = true;
        }
        self.batch_set_notifications(&unread).await?;
        Ok(unread.len())
    }

    /// Delete one of the user's notifications.
    ///
    /// Returns `false` if it does not exist or belongs to someone else.
    pub async fn delete_notification(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> Result<bool, AppError> {
        match self.get_notification(notification_id).await? {
            Some(n) if n.user_id == user_id => {
                self.get_client()?
                    .fluent()
                    .delete()
                    .from(collections::NOTIFICATIONS)
                    .document_id(notification_id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Delete all of the user's notifications. Returns how many were removed.
    pub async fn delete_all_notifications(&self, user_id: &str) -> Result<usize, AppError> {
        let notifications: Vec<Notification> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.batch_delete(&notifications, collections::NOTIFICATIONS, |n| n.id.clone())
            .await?;

        tracing::debug!(user_id, count = notifications.len(), "Deleted notifications");
        Ok(notifications.len())
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// User IDs of all admins (recipients of submission notifications).
    pub async fn list_admin_ids(&self) -> Result<Vec<String>, AppError> {
        let admins: Vec<Profile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .filter(|q| q.for_all([q.field("admin").eq(true)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(admins.into_iter().map(|p| p.id).collect())
    }

    // ─── Helper Methods ──────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

async fn read_resort(
    client: &firestore::FirestoreDb,
    resort_id: &str,
) -> Result<Option<ResortRecord>, AppError> {
    client
        .fluent()
        .select()
        .by_id_in(collections::RESORTS)
        .obj()
        .one(resort_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

impl StatsSource for FirestoreDb {
    fn list_resorts(&self) -> impl Future<Output = Result<Vec<ResortRecord>, AppError>> + Send {
        self.list_all_resorts()
    }

    fn list_ski_days(
        &self,
        filter: SkiDayFilter,
    ) -> impl Future<Output = Result<Vec<SkiDayRecord>, AppError>> + Send {
        async move { self.query_ski_days(&filter).await }
    }
}
