//! The redirect surface: `GET /{slug}` and the password verification step
//!
//! Response mapping is fixed by the resolution outcome: Ready → 302,
//! NotFound → 404, Expired → 410, PasswordRequired → 401 challenge,
//! LookupFailed → 500. The click recorder is invoked only on the Ready
//! path, after the response is already decided, and never awaited.

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use governor::middleware::NoOpMiddleware;
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::analytics::{ClickContext, ClickRecorder};
use crate::config::get_config;
use crate::services::{Resolution, Resolver};
use crate::utils::ip::is_trusted_proxy;
use crate::utils::is_valid_slug;

#[derive(Debug, Deserialize)]
pub struct PasswordAttempt {
    pub password: String,
}

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        resolver: web::Data<Arc<Resolver>>,
        recorder: web::Data<Arc<ClickRecorder>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        if !is_valid_slug(&slug) {
            // malformed slugs can never exist in storage; skip the lookup
            trace!("Invalid slug rejected: {}", &slug);
            return Self::not_found_response();
        }

        match resolver.resolve(&slug).await {
            Ok(Resolution::Ready(target)) => {
                recorder.record(target.id.clone(), ClickContext::from_request(&req));
                Self::redirect_response(&target.target_url)
            }
            Ok(Resolution::NotFound) => {
                debug!("Redirect slug not found: {}", &slug);
                Self::not_found_response()
            }
            Ok(Resolution::Expired) => Self::gone_response(),
            Ok(Resolution::PasswordRequired) | Ok(Resolution::PasswordIncorrect) => {
                Self::password_challenge_response(&slug)
            }
            Err(e) => {
                error!("{}", e);
                Self::error_response()
            }
        }
    }

    /// Password verification step: same slug, POST with a candidate.
    /// Success transitions straight to the redirect case.
    pub async fn verify_password(
        req: HttpRequest,
        path: web::Path<String>,
        body: web::Json<PasswordAttempt>,
        resolver: web::Data<Arc<Resolver>>,
        recorder: web::Data<Arc<ClickRecorder>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        if !is_valid_slug(&slug) {
            return Self::not_found_response();
        }

        match resolver.resolve_with_password(&slug, &body.password).await {
            Ok(Resolution::Ready(target)) => {
                recorder.record(target.id.clone(), ClickContext::from_request(&req));
                Self::redirect_response(&target.target_url)
            }
            Ok(Resolution::NotFound) => Self::not_found_response(),
            Ok(Resolution::Expired) => Self::gone_response(),
            Ok(Resolution::PasswordIncorrect) | Ok(Resolution::PasswordRequired) => {
                debug!("Password verification failed for slug: {}", &slug);
                Self::invalid_password_response()
            }
            Err(e) => {
                error!("{}", e);
                Self::error_response()
            }
        }
    }

    fn redirect_response(target_url: &str) -> HttpResponse {
        HttpResponse::build(StatusCode::FOUND)
            .insert_header(("Location", target_url))
            // links can be deleted, expired, or re-gated after the fact;
            // intermediaries must not replay old redirects
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .finish()
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn gone_response() -> HttpResponse {
        HttpResponse::build(StatusCode::GONE)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("This link has expired")
    }

    fn password_challenge_response(slug: &str) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED)
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .json(serde_json::json!({
                "code": 401,
                "data": {
                    "error": "password_required",
                    "slug": slug,
                }
            }))
    }

    fn invalid_password_response() -> HttpResponse {
        // deliberately does not say which part of the credential was wrong
        HttpResponse::build(StatusCode::UNAUTHORIZED)
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .json(serde_json::json!({
                "code": 401,
                "data": { "error": "Invalid password" }
            }))
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }
}

/// Rate-limit key for password attempts: the connection IP, or the
/// forwarded address when the peer is a configured trusted proxy.
#[derive(Clone, Copy)]
pub struct VerifyKeyExtractor;

impl KeyExtractor for VerifyKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let conn_info = req.connection_info();

        let peer_ip = conn_info
            .peer_addr()
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))?;

        let trusted_proxies = &get_config().api.trusted_proxies;
        if !trusted_proxies.is_empty() && is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = conn_info.realip_remote_addr().unwrap_or(peer_ip);
            return Ok(real_ip.to_string());
        }

        Ok(peer_ip.to_string())
    }
}

/// Limiter for the verification POST: 1 attempt/s steady, burst of 5,
/// keyed per client IP. GET/HEAD redirects pass through untouched.
pub fn verify_rate_limiter() -> Governor<VerifyKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .methods(vec![actix_web::http::Method::POST])
        .key_extractor(VerifyKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    Governor::new(&config)
}

/// Redirect route configuration
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{slug}", web::get().to(RedirectService::handle_redirect))
        .route("/{slug}", web::head().to(RedirectService::handle_redirect))
        .route("/{slug}", web::post().to(RedirectService::verify_password))
}
