//! Health endpoints
//!
//! `/health` performs a datastore round-trip with a bounded timeout;
//! `/health/ready` and `/health/live` are cheap probes for orchestrators.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{error, trace};

use crate::storage::UrlStore;

/// Application start time, for uptime reporting
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<UrlStore>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let storage_status =
            match tokio::time::timeout(Duration::from_secs(5), store.ping()).await {
                Ok(Ok(())) => json!({
                    "status": "healthy",
                    "backend": store.backend_name(),
                }),
                Ok(Err(e)) => {
                    error!("Storage health check failed: {}", e);
                    json!({
                        "status": "unhealthy",
                        "error": e.to_string(),
                        "backend": store.backend_name(),
                    })
                }
                Err(_) => {
                    error!("Storage health check timeout");
                    json!({
                        "status": "unhealthy",
                        "error": "timeout",
                        "backend": store.backend_name(),
                    })
                }
            };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        let is_healthy = storage_status["status"] == "healthy";

        let response_status = if is_healthy {
            actix_web::http::StatusCode::OK
        } else {
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        };

        HttpResponse::build(response_status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(json!({
                "status": if is_healthy { "healthy" } else { "unhealthy" },
                "timestamp": now.to_rfc3339(),
                "uptime": uptime_seconds,
                "checks": {
                    "storage": storage_status,
                },
                "response_time_ms": start_time.elapsed().as_millis(),
            }))
    }

    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health route configuration
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
}
