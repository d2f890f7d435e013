// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST); they skip otherwise. Every test uses unique
//! IDs so runs against a shared emulator do not interfere.

use chrono::NaiveDate;
use ski_tracker::db::SkiDayFilter;
use ski_tracker::error::AppError;
use ski_tracker::models::resort::ResortInput;
use ski_tracker::models::{NotificationType, Profile, ResortRecord, SkiDayRecord};
use ski_tracker::services::{fetch_personal_stats, FetchPolicy, ModerationService};
use ski_tracker::time_utils::now_rfc3339;

mod common;
use common::{test_db, unique_id};

fn approved_resort(id: &str, name: &str, country: &str) -> ResortRecord {
    ResortRecord {
        id: id.to_string(),
        name: name.to_string(),
        approved: true,
        location_country: Some(country.to_string()),
        location_city: None,
        location_area: None,
        height_m: None,
        lifts: None,
        skislopes_km: None,
        submitted_by: None,
        created_at: now_rfc3339(),
    }
}

fn ski_day(user_id: &str, resort_id: &str, date: &str, rating: Option<f64>) -> SkiDayRecord {
    SkiDayRecord {
        id: unique_id("day"),
        user_id: user_id.to_string(),
        date: date.parse().unwrap(),
        resort_id: Some(resort_id.to_string()),
        hours: Some(5.0),
        distance_km: Some(20.0),
        rating,
        notes: None,
        ski_types: None,
    }
}

fn resort_input(name: &str) -> ResortInput {
    ResortInput {
        name: name.to_string(),
        location_country: Some("Switzerland".to_string()),
        location_city: None,
        location_area: None,
        height_m: Some(3330),
        lifts: Some(67),
        skislopes_km: Some(412.0),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SKI DAY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_ski_day_roundtrip_and_user_filter() {
    require_emulator!();

    let db = test_db().await;
    let user_a = unique_id("user");
    let user_b = unique_id("user");
    let resort_id = unique_id("resort");

    let days = vec![
        ski_day(&user_a, &resort_id, "2024-01-10", Some(4.0)),
        ski_day(&user_a, &resort_id, "2024-02-03", None),
        ski_day(&user_b, &resort_id, "2024-01-11", Some(3.0)),
    ];
    db.batch_set_ski_days(&days).await.unwrap();

    let fetched = db.get_ski_day(&days[0].id).await.unwrap();
    assert_eq!(fetched.as_ref(), Some(&days[0]));

    let mine = db
        .query_ski_days(&SkiDayFilter::User(user_a.clone()))
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|d| d.user_id == user_a));
    // Newest first
    assert_eq!(mine[0].date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());

    db.delete_ski_day(&days[0].id).await.unwrap();
    assert!(db.get_ski_day(&days[0].id).await.unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// STATISTICS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_personal_stats_from_firestore() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let verbier = approved_resort(&unique_id("resort"), "Verbier", "Switzerland");
    let zermatt = approved_resort(&unique_id("resort"), "Zermatt", "Switzerland");
    db.set_resort(&verbier).await.unwrap();
    db.set_resort(&zermatt).await.unwrap();

    let days = vec![
        ski_day(&user_id, &verbier.id, "2024-01-10", Some(4.0)),
        ski_day(&user_id, &verbier.id, "2024-01-11", Some(5.0)),
        ski_day(&user_id, &zermatt.id, "2024-01-12", None),
    ];
    db.batch_set_ski_days(&days).await.unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let stats = fetch_personal_stats(&db, &user_id, today, &FetchPolicy::default()).await;

    assert_eq!(stats.total_days, 3);
    assert_eq!(stats.total_hours, 15.0);
    assert_eq!(stats.total_distance, 60.0);
    assert_eq!(stats.avg_rating, Some(4.5));
    assert_eq!(stats.unique_resorts, 2);
    let top = stats.most_visited_resort.unwrap();
    assert_eq!(top.name, "Verbier");
    assert_eq!(top.visits, 2);
}

#[tokio::test]
async fn test_personal_stats_for_user_without_days() {
    require_emulator!();

    let db = test_db().await;
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let stats =
        fetch_personal_stats(&db, &unique_id("user"), today, &FetchPolicy::default()).await;

    assert_eq!(stats.total_days, 0);
    assert!(stats.avg_rating.is_none());
    assert!(stats.most_visited_resort.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// MODERATION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_submit_and_approve_resort() {
    require_emulator!();

    let db = test_db().await;
    let moderation = ModerationService::new(db.clone());
    let submitter = unique_id("user");
    let admin_id = unique_id("admin");
    db.upsert_profile(&Profile {
        id: admin_id.clone(),
        display_name: Some("Admin".to_string()),
        avatar_url: None,
        created_at: now_rfc3339(),
        admin: true,
    })
    .await
    .unwrap();

    let resort = moderation
        .submit_resort(&submitter, resort_input("Verbier"))
        .await
        .unwrap();
    assert!(!resort.approved);

    let pending = db.list_pending_resorts().await.unwrap();
    assert!(pending.iter().any(|r| r.id == resort.id));

    let admin_inbox = db.list_notifications(&admin_id, 50).await.unwrap();
    assert!(admin_inbox.iter().any(|n| n.kind == NotificationType::ResortSubmitted
        && n.resort_id.as_deref() == Some(resort.id.as_str())));

    let approved = moderation.approve_resort(&resort.id).await.unwrap();
    assert!(approved.approved);
    assert!(db
        .list_approved_resorts()
        .await
        .unwrap()
        .iter()
        .any(|r| r.id == resort.id));

    let inbox = db.list_notifications(&submitter, 10).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationType::ResortApproved);
    assert!(!inbox[0].read);
    assert_eq!(db.count_unread_notifications(&submitter).await.unwrap(), 1);

    // Approved is terminal
    let again = moderation.approve_resort(&resort.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    let decline = moderation.decline_resort(&resort.id, None).await;
    assert!(matches!(decline, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_decline_resort_deletes_and_notifies() {
    require_emulator!();

    let db = test_db().await;
    let moderation = ModerationService::new(db.clone());
    let submitter = unique_id("user");

    let resort = moderation
        .submit_resort(&submitter, resort_input("Nowhere Peak"))
        .await
        .unwrap();

    moderation
        .decline_resort(&resort.id, Some("Duplicate of an existing resort"))
        .await
        .unwrap();

    assert!(db.get_resort(&resort.id).await.unwrap().is_none());

    let inbox = db.list_notifications(&submitter, 10).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationType::ResortDeclined);
    assert!(inbox[0].message.contains("Duplicate of an existing resort"));
    assert!(inbox[0].resort_id.is_none());
}

#[tokio::test]
async fn test_decline_after_approve_keeps_resort() {
    require_emulator!();

    let db = test_db().await;
    let moderation = ModerationService::new(db.clone());
    let submitter = unique_id("user");

    let resort = moderation
        .submit_resort(&submitter, resort_input("Sticky Peak"))
        .await
        .unwrap();
    moderation.approve_resort(&resort.id).await.unwrap();

    let result = moderation.decline_resort(&resort.id, None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let stored = db.get_resort(&resort.id).await.unwrap().unwrap();
    assert!(stored.approved);
    let inbox = db.list_notifications(&submitter, 10).await.unwrap();
    assert!(inbox.iter().all(|n| n.kind != NotificationType::ResortDeclined));
}

#[tokio::test]
async fn test_concurrent_approve_and_decline_has_single_outcome() {
    require_emulator!();

    let db = test_db().await;
    let moderation = ModerationService::new(db.clone());
    let submitter = unique_id("user");

    let resort = moderation
        .submit_resort(&submitter, resort_input("Contested Peak"))
        .await
        .unwrap();

    let (approved, declined) = tokio::join!(
        moderation.approve_resort(&resort.id),
        moderation.decline_resort(&resort.id, Some("Duplicate")),
    );

    // At most one decision commits; the loser fails rather than overwriting
    assert!(!(approved.is_ok() && declined.is_ok()));

    let stored = db.get_resort(&resort.id).await.unwrap();
    if approved.is_ok() {
        assert!(stored.as_ref().unwrap().approved);
    }
    if declined.is_ok() {
        assert!(stored.is_none());
    }

    let decisions = db
        .list_notifications(&submitter, 10)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| {
            n.kind == NotificationType::ResortApproved || n.kind == NotificationType::ResortDeclined
        })
        .count();
    assert!(decisions <= 1);
}

#[tokio::test]
async fn test_moderating_missing_resort_is_not_found() {
    require_emulator!();

    let db = test_db().await;
    let moderation = ModerationService::new(db);

    let result = moderation.approve_resort(&unique_id("missing")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// NOTIFICATION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_notification_read_and_delete_ownership() {
    require_emulator!();

    let db = test_db().await;
    let moderation = ModerationService::new(db.clone());
    let owner = unique_id("user");
    let other = unique_id("user");

    for name in ["Resort A", "Resort B"] {
        let resort = moderation
            .submit_resort(&owner, resort_input(name))
            .await
            .unwrap();
        moderation.decline_resort(&resort.id, None).await.unwrap();
    }

    let inbox = db.list_notifications(&owner, 10).await.unwrap();
    assert_eq!(inbox.len(), 2);
    let first = &inbox[0].id;

    // Someone else's notification looks missing
    assert!(!db.mark_notification_read(&other, first).await.unwrap());
    assert!(!db.delete_notification(&other, first).await.unwrap());

    assert!(db.mark_notification_read(&owner, first).await.unwrap());
    assert_eq!(db.count_unread_notifications(&owner).await.unwrap(), 1);

    assert_eq!(db.mark_all_notifications_read(&owner).await.unwrap(), 1);
    assert_eq!(db.count_unread_notifications(&owner).await.unwrap(), 0);

    assert!(db.delete_notification(&owner, first).await.unwrap());
    assert_eq!(db.delete_all_notifications(&owner).await.unwrap(), 1);
    assert!(db.list_notifications(&owner, 10).await.unwrap().is_empty());
}
