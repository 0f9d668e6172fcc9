//! Guest link cleanup and migration tests
//!
//! The cleanup job is a single bulk statement and must be idempotent:
//! a second run over the same data set reports zero rows. Cleanup sweeps
//! are global, so every test here gets its own database.

use std::sync::Arc;

use actix_web::middleware::from_fn;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use linkhop::api::admin::admin_routes;
use linkhop::api::middleware::AuthMiddleware;
use linkhop::config::init_config;
use linkhop::services::{Resolution, Resolver};
use linkhop::storage::{ShortUrl, UrlStore};

use std::sync::Once;

const TEST_TOKEN: &str = "cleanup-test-token";

static INIT: Once = Once::new();

/// Fresh store per test; keep the TempDir alive with it
async fn new_store() -> (TempDir, Arc<UrlStore>) {
    INIT.call_once(|| {
        unsafe {
            std::env::set_var("LH__API__ADMIN_TOKEN", TEST_TOKEN);
        }
        init_config();
    });

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("cleanup_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let store = Arc::new(
        UrlStore::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (temp_dir, store)
}

/// Build a guest link whose guest_created_at lies `age_days` in the past
fn guest_url(slug: &str, session_id: &str, age_days: i64) -> ShortUrl {
    let created = Utc::now() - Duration::days(age_days);
    ShortUrl {
        id: Uuid::new_v4().to_string(),
        slug: slug.to_string(),
        target_url: "https://example.com/guest".to_string(),
        owner_id: None,
        is_public: false,
        title: None,
        description: None,
        password: None,
        click_count: 0,
        created_at: created,
        updated_at: created,
        deleted_at: None,
        expires_at: Some(created + Duration::days(7)),
        is_guest: true,
        guest_session_id: Some(session_id.to_string()),
        guest_created_at: Some(created),
    }
}

// =============================================================================
// Cleanup
// =============================================================================

#[tokio::test]
async fn test_cleanup_is_idempotent() {
    let (_dir, store) = new_store().await;

    store.insert(guest_url("oldg1", "sess-old", 10)).await.unwrap();
    store.insert(guest_url("oldg2", "sess-old", 8)).await.unwrap();
    store.insert(guest_url("freshg1", "sess-new", 1)).await.unwrap();

    // a stale non-guest link must never be touched by guest cleanup
    let mut owned = guest_url("ownedold", "unused", 30);
    owned.is_guest = false;
    owned.guest_session_id = None;
    owned.guest_created_at = None;
    owned.expires_at = None;
    store.insert(owned).await.unwrap();

    let deleted = store.cleanup_expired_guest_urls(7).await.unwrap();
    assert_eq!(deleted, 2);

    // second run over the same window: nothing left to delete
    let deleted = store.cleanup_expired_guest_urls(7).await.unwrap();
    assert_eq!(deleted, 0);

    let fresh = store.find_by_slug("freshg1").await.unwrap().unwrap();
    assert!(fresh.deleted_at.is_none());

    let owned = store.find_by_slug("ownedold").await.unwrap().unwrap();
    assert!(owned.deleted_at.is_none());

    let old = store.find_by_slug("oldg1").await.unwrap().unwrap();
    assert!(old.deleted_at.is_some());
}

#[tokio::test]
async fn test_cleaned_link_no_longer_resolves() {
    let (_dir, store) = new_store().await;

    store
        .insert(guest_url("cleanme1", "sess-clean", 12))
        .await
        .unwrap();

    let resolver = Resolver::new(Arc::clone(&store));
    store.cleanup_expired_guest_urls(7).await.unwrap();

    // soft-deleted by cleanup → indistinguishable from never existing
    let outcome = resolver.resolve("cleanme1").await.unwrap();
    assert_eq!(outcome, Resolution::NotFound);
}

#[tokio::test]
async fn test_cleanup_endpoint_reports_count() {
    let (_dir, store) = new_store().await;

    store
        .insert(guest_url("httpold1", "sess-http", 9))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(Arc::clone(&store)))
            .service(admin_routes().wrap(from_fn(AuthMiddleware::admin_auth))),
    )
    .await;

    let trigger = || {
        TestRequest::post()
            .uri("/admin/maintenance/guest-cleanup")
            .insert_header(("Authorization", format!("Bearer {}", TEST_TOKEN)))
            .to_request()
    };

    let body: serde_json::Value = test::call_and_read_body_json(&app, trigger()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["days_old"], 7);
    assert_eq!(body["deleted_count"], 1);
    assert!(body["timestamp"].is_string());

    // running the trigger twice in the same window is a no-op
    let body: serde_json::Value = test::call_and_read_body_json(&app, trigger()).await;
    assert_eq!(body["deleted_count"], 0);
}

// =============================================================================
// Guest migration
// =============================================================================

#[tokio::test]
async fn test_migrate_guest_urls() {
    let (_dir, store) = new_store().await;

    store.insert(guest_url("mig1", "sess-mig", 1)).await.unwrap();
    store.insert(guest_url("mig2", "sess-mig", 2)).await.unwrap();
    store.insert(guest_url("other1", "sess-other", 1)).await.unwrap();

    let ids = store
        .migrate_guest_urls("sess-mig", "owner-42")
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);

    let migrated = store.find_by_slug("mig1").await.unwrap().unwrap();
    assert_eq!(migrated.owner_id.as_deref(), Some("owner-42"));
    assert!(!migrated.is_guest);
    assert!(migrated.guest_session_id.is_none());
    assert!(migrated.guest_created_at.is_none());

    // other sessions are untouched
    let other = store.find_by_slug("other1").await.unwrap().unwrap();
    assert!(other.is_guest);

    // idempotent: the session has no guest links left
    let ids = store
        .migrate_guest_urls("sess-mig", "owner-42")
        .await
        .unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_migrate_guest_endpoint() {
    let (_dir, store) = new_store().await;

    store.insert(guest_url("mige1", "sess-http-mig", 1)).await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(Arc::clone(&store)))
            .service(admin_routes().wrap(from_fn(AuthMiddleware::admin_auth))),
    )
    .await;

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        TestRequest::post()
            .uri("/admin/maintenance/guest-migrate")
            .insert_header(("Authorization", format!("Bearer {}", TEST_TOKEN)))
            .set_json(serde_json::json!({
                "guest_session_id": "sess-http-mig",
                "owner_id": "owner-9"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["migrated_count"], 1);
    assert_eq!(body["data"]["url_ids"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_migrated_link_survives_guest_cleanup() {
    let (_dir, store) = new_store().await;

    store
        .insert(guest_url("keepme1", "sess-keep", 10))
        .await
        .unwrap();

    store
        .migrate_guest_urls("sess-keep", "owner-7")
        .await
        .unwrap();

    // the guest markers are gone, so retention no longer applies
    store.cleanup_expired_guest_urls(7).await.unwrap();
    let kept = store.find_by_slug("keepme1").await.unwrap().unwrap();
    assert!(kept.deleted_at.is_none());
}
