//! Write operations for UrlStore

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, SqlErr, sea_query::Expr};
use tracing::info;

use super::UrlStore;
use super::models::{ShortUrl, short_url_to_active_model};
use crate::errors::{LinkhopError, Result};

use migration::entities::short_url;

impl UrlStore {
    /// Insert a fully-built link row. A slug collision surfaces as
    /// `Conflict`, not a generic database error.
    pub async fn insert(&self, url: ShortUrl) -> Result<ShortUrl> {
        let active = short_url_to_active_model(&url);

        short_url::Entity::insert(active)
            .exec(self.db())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    LinkhopError::conflict(format!("Slug already in use: {}", url.slug))
                }
                _ => LinkhopError::database_operation(format!("Failed to insert link: {}", e)),
            })?;

        info!("Link created: {} -> {}", url.slug, url.target_url);
        Ok(url)
    }

    /// Persist a modified link (full-row update keyed by id)
    pub async fn update(&self, url: &ShortUrl) -> Result<()> {
        let active = short_url_to_active_model(url);

        short_url::Entity::update(active)
            .exec(self.db())
            .await
            .map_err(|e| {
                LinkhopError::database_operation(format!(
                    "Failed to update link {}: {}",
                    url.slug, e
                ))
            })?;

        Ok(())
    }

    /// Soft-delete a live link. Returns false when the slug does not exist
    /// or is already deleted.
    pub async fn soft_delete(&self, slug: &str) -> Result<bool> {
        let now = Utc::now();

        let result = short_url::Entity::update_many()
            .col_expr(short_url::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(short_url::Column::UpdatedAt, Expr::value(now))
            .filter(short_url::Column::Slug.eq(slug))
            .filter(short_url::Column::DeletedAt.is_null())
            .exec(self.db())
            .await?;

        if result.rows_affected > 0 {
            info!("Link soft-deleted: {}", slug);
        }
        Ok(result.rows_affected > 0)
    }

    /// Undo a soft delete. Returns false when nothing was restorable.
    pub async fn restore(&self, slug: &str) -> Result<bool> {
        let result = short_url::Entity::update_many()
            .col_expr(
                short_url::Column::DeletedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(short_url::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(short_url::Column::Slug.eq(slug))
            .filter(short_url::Column::DeletedAt.is_not_null())
            .exec(self.db())
            .await?;

        if result.rows_affected > 0 {
            info!("Link restored: {}", slug);
        }
        Ok(result.rows_affected > 0)
    }

    /// Permanently delete a link; click rows go with it (FK cascade).
    pub async fn purge(&self, slug: &str) -> Result<bool> {
        let result = short_url::Entity::delete_many()
            .filter(short_url::Column::Slug.eq(slug))
            .exec(self.db())
            .await?;

        if result.rows_affected > 0 {
            info!("Link permanently deleted: {}", slug);
        }
        Ok(result.rows_affected > 0)
    }

    /// Bulk soft-delete of guest links past the retention window.
    ///
    /// Single statement, idempotent: already-deleted rows are excluded from
    /// the match, so a second run in the same window reports 0.
    pub async fn cleanup_expired_guest_urls(&self, retention_days: i64) -> Result<u64> {
        let now = Utc::now();
        let cutoff = now - Duration::days(retention_days);

        let result = short_url::Entity::update_many()
            .col_expr(short_url::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(short_url::Column::UpdatedAt, Expr::value(now))
            .filter(short_url::Column::IsGuest.eq(true))
            .filter(short_url::Column::DeletedAt.is_null())
            .filter(short_url::Column::GuestCreatedAt.lt(cutoff))
            .exec(self.db())
            .await?;

        info!(
            "Guest cleanup: {} links soft-deleted (older than {} days)",
            result.rows_affected, retention_days
        );
        Ok(result.rows_affected)
    }

    /// Reassign all live links of a guest session to an owner, clearing the
    /// guest markers. Returns the ids of the migrated links.
    pub async fn migrate_guest_urls(
        &self,
        guest_session_id: &str,
        owner_id: &str,
    ) -> Result<Vec<String>> {
        let ids: Vec<String> = short_url::Entity::find()
            .filter(short_url::Column::GuestSessionId.eq(guest_session_id))
            .filter(short_url::Column::IsGuest.eq(true))
            .filter(short_url::Column::DeletedAt.is_null())
            .all(self.db())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        if ids.is_empty() {
            return Ok(ids);
        }

        short_url::Entity::update_many()
            .col_expr(
                short_url::Column::OwnerId,
                Expr::value(Some(owner_id.to_string())),
            )
            .col_expr(short_url::Column::IsGuest, Expr::value(false))
            .col_expr(
                short_url::Column::GuestSessionId,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                short_url::Column::GuestCreatedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(short_url::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(short_url::Column::Id.is_in(ids.clone()))
            .exec(self.db())
            .await?;

        info!(
            "Migrated {} guest links from session {} to owner {}",
            ids.len(),
            guest_session_id,
            owner_id
        );
        Ok(ids)
    }
}
