//! Health endpoint tests

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use tempfile::TempDir;

use linkhop::api::health::health_routes;
use linkhop::api::AppStartTime;
use linkhop::config::init_config;
use linkhop::storage::UrlStore;

use std::sync::Once;

static INIT: Once = Once::new();

async fn new_store() -> (TempDir, Arc<UrlStore>) {
    INIT.call_once(|| {
        init_config();
    });

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("health_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let store = Arc::new(
        UrlStore::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (temp_dir, store)
}

#[tokio::test]
async fn test_health_check_reports_healthy() {
    let (_dir, store) = new_store().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(store))
            .app_data(web::Data::new(AppStartTime {
                start_datetime: chrono::Utc::now(),
            }))
            .service(health_routes()),
    )
    .await;

    let body: serde_json::Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["storage"]["status"], "healthy");
    assert_eq!(body["checks"]["storage"]["backend"], "sqlite");
    assert!(body["uptime"].is_u64());
}

#[tokio::test]
async fn test_readiness_and_liveness() {
    let (_dir, store) = new_store().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(store))
            .app_data(web::Data::new(AppStartTime {
                start_datetime: chrono::Utc::now(),
            }))
            .service(health_routes()),
    )
    .await;

    let resp =
        test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp =
        test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
