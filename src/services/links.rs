//! Link lifecycle logic: creation and updates
//!
//! Validation happens here, at write time — target URL scheme checks,
//! slug format, reserved-path rejection, password hashing, guest expiry
//! defaults. The resolver never re-checks any of this.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::get_config;
use crate::errors::{LinkhopError, Result};
use crate::storage::{ShortUrl, UrlStore};
use crate::utils::password::{process_new_password, process_update_password};
use crate::utils::url_validator::validate_target_url;
use crate::utils::{generate_slug, is_reserved_slug, is_valid_slug};

/// Length of auto-generated slugs
pub const GENERATED_SLUG_LENGTH: usize = 6;

/// Collision retries before giving up on slug generation
const MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Input for link creation
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    /// Caller-chosen slug; None requests auto-generation
    pub slug: Option<String>,
    pub target_url: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Plaintext; hashed before it ever reaches storage
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_guest: bool,
    pub guest_session_id: Option<String>,
}

/// Input for link updates
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub target_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// None keeps the current password, empty string removes the gate
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub clear_expiry: bool,
}

pub struct LinkService;

impl LinkService {
    pub async fn create(store: &Arc<UrlStore>, req: NewLink) -> Result<ShortUrl> {
        validate_target_url(&req.target_url)
            .map_err(|e| LinkhopError::validation(e.user_message()))?;

        if req.is_guest && req.guest_session_id.is_none() {
            return Err(LinkhopError::validation(
                "Guest links require a guest_session_id",
            ));
        }

        let now = Utc::now();

        // Guest links always expire; default to the retention window
        let expires_at = if req.is_guest && req.expires_at.is_none() {
            Some(now + Duration::days(get_config().cleanup.guest_retention_days))
        } else {
            req.expires_at
        };

        let password = process_new_password(req.password.as_deref())
            .map_err(|e| LinkhopError::password_hash(e.to_string()))?;

        let build = |slug: String| ShortUrl {
            id: Uuid::new_v4().to_string(),
            slug,
            target_url: req.target_url.trim().to_string(),
            owner_id: req.owner_id.clone(),
            is_public: req.is_public,
            title: req.title.clone(),
            description: req.description.clone(),
            password: password.clone(),
            click_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            expires_at,
            is_guest: req.is_guest,
            guest_session_id: req.guest_session_id.clone(),
            guest_created_at: req.is_guest.then_some(now),
        };

        match req.slug {
            Some(slug) => {
                validate_new_slug(&slug)?;
                store.insert(build(slug)).await
            }
            None => {
                // Random slugs can collide; retry a few times before failing
                let mut last_err = None;
                for _ in 0..MAX_GENERATION_ATTEMPTS {
                    let slug = generate_slug(GENERATED_SLUG_LENGTH);
                    if is_reserved_slug(&slug) {
                        continue;
                    }
                    match store.insert(build(slug)).await {
                        Ok(url) => return Ok(url),
                        Err(e @ LinkhopError::Conflict(_)) => last_err = Some(e),
                        Err(e) => return Err(e),
                    }
                }
                Err(last_err.unwrap_or_else(|| {
                    LinkhopError::conflict("Could not generate a unique slug")
                }))
            }
        }
    }

    pub async fn update(store: &Arc<UrlStore>, slug: &str, upd: LinkUpdate) -> Result<ShortUrl> {
        let mut url = store
            .find_by_slug(slug)
            .await?
            .filter(|u| u.deleted_at.is_none())
            .ok_or_else(|| LinkhopError::not_found(format!("Link not found: {}", slug)))?;

        if let Some(target_url) = upd.target_url {
            validate_target_url(&target_url)
                .map_err(|e| LinkhopError::validation(e.user_message()))?;
            url.target_url = target_url.trim().to_string();
        }
        if let Some(title) = upd.title {
            url.title = Some(title);
        }
        if let Some(description) = upd.description {
            url.description = Some(description);
        }

        url.password = process_update_password(upd.password.as_deref(), url.password.take())
            .map_err(|e| LinkhopError::password_hash(e.to_string()))?;

        if upd.clear_expiry {
            url.expires_at = None;
        } else if let Some(expires_at) = upd.expires_at {
            url.expires_at = Some(expires_at);
        }

        url.updated_at = Utc::now();
        store.update(&url).await?;
        Ok(url)
    }
}

fn validate_new_slug(slug: &str) -> Result<()> {
    if !is_valid_slug(slug) {
        return Err(LinkhopError::validation(
            "Slug must be 3-50 characters of letters, digits, hyphens, or underscores",
        ));
    }
    if is_reserved_slug(slug) {
        return Err(LinkhopError::validation(format!(
            "Slug is a reserved path: {}",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_new_slug() {
        assert!(validate_new_slug("abc123").is_ok());
        assert!(validate_new_slug("my-link").is_ok());

        assert!(matches!(
            validate_new_slug("ab"),
            Err(LinkhopError::Validation(_))
        ));
        assert!(matches!(
            validate_new_slug("has space"),
            Err(LinkhopError::Validation(_))
        ));
        // reserved names are refused regardless of case
        assert!(matches!(
            validate_new_slug("admin"),
            Err(LinkhopError::Validation(_))
        ));
        assert!(matches!(
            validate_new_slug("Dashboard"),
            Err(LinkhopError::Validation(_))
        ));
    }
}
