//! Admin API: link lifecycle and maintenance triggers
//!
//! Token-protected scope (see middleware::auth). Responses use the
//! `{code, data}` envelope; `code` 0 means success.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::get_config;
use crate::errors::LinkhopError;
use crate::services::LinkService;
use crate::services::links::{LinkUpdate, NewLink};
use crate::storage::{ShortUrl, UrlFilter, UrlStore};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

/// Link payload returned by the admin API; never carries the password hash
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LinkPayload {
    pub id: String,
    pub slug: String,
    pub target_url: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub click_count: i64,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_guest: bool,
}

impl From<ShortUrl> for LinkPayload {
    fn from(url: ShortUrl) -> Self {
        Self {
            id: url.id,
            slug: url.slug,
            target_url: url.target_url,
            owner_id: url.owner_id,
            is_public: url.is_public,
            title: url.title,
            description: url.description,
            click_count: url.click_count,
            has_password: url.password.is_some(),
            created_at: url.created_at,
            updated_at: url.updated_at,
            deleted_at: url.deleted_at,
            expires_at: url.expires_at,
            is_guest: url.is_guest,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostNewLink {
    pub slug: Option<String>,
    pub target_url: String,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_guest: bool,
    pub guest_session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PutLink {
    pub target_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// None keeps the current password, empty string removes the gate
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_expiry: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GetLinksQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub owner_id: Option<String>,
    pub include_deleted: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MigrateGuestRequest {
    pub guest_session_id: String,
    pub owner_id: String,
}

pub struct AdminService;

impl AdminService {
    pub async fn get_links(
        query: web::Query<GetLinksQuery>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

        let filter = UrlFilter {
            owner_id: query.owner_id.clone(),
            include_deleted: query.include_deleted.unwrap_or(false),
        };

        match store.list(&filter, page, page_size).await {
            Ok((urls, total)) => {
                let links: Vec<LinkPayload> = urls.into_iter().map(LinkPayload::from).collect();
                HttpResponse::Ok().json(serde_json::json!({
                    "code": 0,
                    "data": links,
                    "pagination": PaginationInfo {
                        page,
                        page_size,
                        total,
                        total_pages: total.div_ceil(page_size),
                    },
                }))
            }
            Err(e) => Self::storage_error("list links", &e),
        }
    }

    pub async fn post_link(
        body: web::Json<PostNewLink>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let body = body.into_inner();
        let new_link = NewLink {
            slug: body.slug,
            target_url: body.target_url,
            owner_id: body.owner_id,
            is_public: body.is_public,
            title: body.title,
            description: body.description,
            password: body.password,
            expires_at: body.expires_at,
            is_guest: body.is_guest,
            guest_session_id: body.guest_session_id,
        };

        match LinkService::create(store.get_ref(), new_link).await {
            Ok(url) => HttpResponse::Created().json(ApiResponse {
                code: 0,
                data: LinkPayload::from(url),
            }),
            Err(e) => Self::service_error(&e),
        }
    }

    pub async fn get_link(
        path: web::Path<String>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match store.find_by_slug(&slug).await {
            Ok(Some(url)) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: LinkPayload::from(url),
            }),
            Ok(None) => Self::not_found(&slug),
            Err(e) => Self::storage_error("get link", &e),
        }
    }

    pub async fn put_link(
        path: web::Path<String>,
        body: web::Json<PutLink>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let slug = path.into_inner();
        let body = body.into_inner();
        let update = LinkUpdate {
            target_url: body.target_url,
            title: body.title,
            description: body.description,
            password: body.password,
            expires_at: body.expires_at,
            clear_expiry: body.clear_expiry,
        };

        match LinkService::update(store.get_ref(), &slug, update).await {
            Ok(url) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: LinkPayload::from(url),
            }),
            Err(e) => Self::service_error(&e),
        }
    }

    /// Soft delete: the slug stops resolving but stays restorable
    pub async fn delete_link(
        path: web::Path<String>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match store.soft_delete(&slug).await {
            Ok(true) => HttpResponse::Ok().json(serde_json::json!({
                "code": 0,
                "data": { "slug": slug, "deleted": true },
            })),
            Ok(false) => Self::not_found(&slug),
            Err(e) => Self::storage_error("delete link", &e),
        }
    }

    pub async fn restore_link(
        path: web::Path<String>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match store.restore(&slug).await {
            Ok(true) => HttpResponse::Ok().json(serde_json::json!({
                "code": 0,
                "data": { "slug": slug, "restored": true },
            })),
            Ok(false) => Self::not_found(&slug),
            Err(e) => Self::storage_error("restore link", &e),
        }
    }

    /// Permanent delete; the clicks of the link go with it
    pub async fn purge_link(
        path: web::Path<String>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match store.purge(&slug).await {
            Ok(true) => HttpResponse::Ok().json(serde_json::json!({
                "code": 0,
                "data": { "slug": slug, "purged": true },
            })),
            Ok(false) => Self::not_found(&slug),
            Err(e) => Self::storage_error("purge link", &e),
        }
    }

    /// Scheduled-cleanup trigger: soft-delete guest links past retention.
    /// Idempotent; reports the affected row count for monitoring.
    pub async fn guest_cleanup(store: web::Data<Arc<UrlStore>>) -> impl Responder {
        let days_old = get_config().cleanup.guest_retention_days;

        match store.cleanup_expired_guest_urls(days_old).await {
            Ok(deleted_count) => {
                info!("Guest cleanup trigger: {} links soft-deleted", deleted_count);
                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "deleted_count": deleted_count,
                    "days_old": days_old,
                    "timestamp": Utc::now().to_rfc3339(),
                }))
            }
            Err(e) => {
                error!("Guest cleanup failed: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                    "timestamp": Utc::now().to_rfc3339(),
                }))
            }
        }
    }

    /// Hand all live links of a guest session to an authenticated owner
    pub async fn migrate_guest_links(
        body: web::Json<MigrateGuestRequest>,
        store: web::Data<Arc<UrlStore>>,
    ) -> impl Responder {
        match store
            .migrate_guest_urls(&body.guest_session_id, &body.owner_id)
            .await
        {
            Ok(url_ids) => HttpResponse::Ok().json(serde_json::json!({
                "code": 0,
                "data": {
                    "migrated_count": url_ids.len(),
                    "url_ids": url_ids,
                },
            })),
            Err(e) => Self::storage_error("migrate guest links", &e),
        }
    }

    fn not_found(slug: &str) -> HttpResponse {
        HttpResponse::NotFound().json(serde_json::json!({
            "code": 404,
            "data": { "error": format!("Link not found: {}", slug) },
        }))
    }

    fn service_error(e: &LinkhopError) -> HttpResponse {
        let (status, code) = match e {
            LinkhopError::Validation(_) => (HttpResponse::BadRequest(), 400),
            LinkhopError::NotFound(_) => (HttpResponse::NotFound(), 404),
            LinkhopError::Conflict(_) => (HttpResponse::Conflict(), 409),
            _ => {
                error!("Admin API error [{}]: {}", e.code(), e);
                (HttpResponse::InternalServerError(), 500)
            }
        };

        let mut builder = status;
        builder.json(serde_json::json!({
            "code": code,
            "data": { "error": e.message() },
        }))
    }

    fn storage_error(context: &str, e: &LinkhopError) -> HttpResponse {
        error!("Admin API failed to {} [{}]: {}", context, e.code(), e);
        HttpResponse::InternalServerError().json(serde_json::json!({
            "code": 500,
            "data": { "error": "Internal server error" },
        }))
    }
}

/// Admin route configuration (mounted behind the auth middleware)
pub fn admin_routes() -> actix_web::Scope {
    web::scope("/admin")
        .route("/link", web::get().to(AdminService::get_links))
        .route("/link", web::post().to(AdminService::post_link))
        .route("/link/{slug}", web::get().to(AdminService::get_link))
        .route("/link/{slug}", web::put().to(AdminService::put_link))
        .route("/link/{slug}", web::delete().to(AdminService::delete_link))
        .route(
            "/link/{slug}/restore",
            web::post().to(AdminService::restore_link),
        )
        .route(
            "/link/{slug}/purge",
            web::delete().to(AdminService::purge_link),
        )
        .route(
            "/maintenance/guest-cleanup",
            web::post().to(AdminService::guest_cleanup),
        )
        .route(
            "/maintenance/guest-migrate",
            web::post().to(AdminService::migrate_guest_links),
        )
}
