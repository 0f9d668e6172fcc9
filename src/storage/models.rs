use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use migration::entities::short_url;

/// Domain view of a stored link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortUrl {
    pub id: String,
    pub slug: String,
    pub target_url: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Argon2id hash; never serialized out through the API
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_guest: bool,
    pub guest_session_id: Option<String>,
    pub guest_created_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// A non-NULL hash means the access gate is on
    pub fn requires_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Not soft-deleted and not expired
    pub fn is_resolvable(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none() && !self.is_expired(now)
    }
}

/// List filter for the admin API
#[derive(Default, Clone, Debug)]
pub struct UrlFilter {
    /// Restrict to one owner
    pub owner_id: Option<String>,
    /// Include soft-deleted rows (default: live rows only)
    pub include_deleted: bool,
}

pub fn model_to_short_url(model: short_url::Model) -> ShortUrl {
    ShortUrl {
        id: model.id,
        slug: model.slug,
        target_url: model.target_url,
        owner_id: model.owner_id,
        is_public: model.is_public,
        title: model.title,
        description: model.description,
        password: model.password,
        click_count: model.click_count,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
        expires_at: model.expires_at,
        is_guest: model.is_guest,
        guest_session_id: model.guest_session_id,
        guest_created_at: model.guest_created_at,
    }
}

pub fn short_url_to_active_model(url: &ShortUrl) -> short_url::ActiveModel {
    use sea_orm::ActiveValue::Set;

    short_url::ActiveModel {
        id: Set(url.id.clone()),
        slug: Set(url.slug.clone()),
        target_url: Set(url.target_url.clone()),
        owner_id: Set(url.owner_id.clone()),
        is_public: Set(url.is_public),
        title: Set(url.title.clone()),
        description: Set(url.description.clone()),
        password: Set(url.password.clone()),
        click_count: Set(url.click_count),
        created_at: Set(url.created_at),
        updated_at: Set(url.updated_at),
        deleted_at: Set(url.deleted_at),
        expires_at: Set(url.expires_at),
        is_guest: Set(url.is_guest),
        guest_session_id: Set(url.guest_session_id.clone()),
        guest_created_at: Set(url.guest_created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_url() -> ShortUrl {
        let now = Utc::now();
        ShortUrl {
            id: "11111111-2222-3333-4444-555555555555".to_string(),
            slug: "abc123".to_string(),
            target_url: "https://example.com/page".to_string(),
            owner_id: None,
            is_public: false,
            title: None,
            description: None,
            password: None,
            click_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            expires_at: None,
            is_guest: false,
            guest_session_id: None,
            guest_created_at: None,
        }
    }

    #[test]
    fn test_resolvable_states() {
        let now = Utc::now();
        let url = sample_url();
        assert!(url.is_resolvable(now));

        let mut expired = sample_url();
        expired.expires_at = Some(now - Duration::days(1));
        assert!(expired.is_expired(now));
        assert!(!expired.is_resolvable(now));

        let mut future = sample_url();
        future.expires_at = Some(now + Duration::days(1));
        assert!(future.is_resolvable(now));

        let mut deleted = sample_url();
        deleted.deleted_at = Some(now);
        assert!(!deleted.is_resolvable(now));
    }

    #[test]
    fn test_requires_password() {
        let mut url = sample_url();
        assert!(!url.requires_password());
        url.password = Some("$argon2id$hash".to_string());
        assert!(url.requires_password());
    }

    #[test]
    fn test_model_round_trip() {
        let url = sample_url();
        let active = short_url_to_active_model(&url);
        use sea_orm::ActiveValue::Set;
        assert_eq!(active.slug, Set(url.slug.clone()));
        assert_eq!(active.click_count, Set(0));
    }
}
