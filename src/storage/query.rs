//! Read operations for UrlStore

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use super::UrlStore;
use super::models::{ShortUrl, UrlFilter, model_to_short_url};
use crate::errors::Result;

use migration::entities::{click, short_url};

impl UrlStore {
    /// Lookup used by the resolver: soft-deleted rows are invisible here,
    /// indistinguishable from rows that never existed.
    pub async fn find_active_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>> {
        let model = short_url::Entity::find()
            .filter(short_url::Column::Slug.eq(slug))
            .filter(short_url::Column::DeletedAt.is_null())
            .one(self.db())
            .await?;

        Ok(model.map(model_to_short_url))
    }

    /// Admin lookup: sees soft-deleted rows too
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>> {
        let model = short_url::Entity::find()
            .filter(short_url::Column::Slug.eq(slug))
            .one(self.db())
            .await?;

        Ok(model.map(model_to_short_url))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ShortUrl>> {
        let model = short_url::Entity::find_by_id(id).one(self.db()).await?;

        Ok(model.map(model_to_short_url))
    }

    /// Paginated listing, newest first. Returns (rows, total count).
    pub async fn list(
        &self,
        filter: &UrlFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<ShortUrl>, u64)> {
        let mut query = short_url::Entity::find();

        if !filter.include_deleted {
            query = query.filter(short_url::Column::DeletedAt.is_null());
        }
        if let Some(ref owner_id) = filter.owner_id {
            query = query.filter(short_url::Column::OwnerId.eq(owner_id));
        }

        let total = query.clone().count(self.db()).await?;

        let models = query
            .order_by_desc(short_url::Column::CreatedAt)
            .paginate(self.db(), page_size)
            .fetch_page(page.saturating_sub(1))
            .await?;

        Ok((models.into_iter().map(model_to_short_url).collect(), total))
    }

    /// Number of recorded clicks for a link
    pub async fn count_clicks(&self, url_id: &str) -> Result<u64> {
        let count = click::Entity::find()
            .filter(click::Column::UrlId.eq(url_id))
            .count(self.db())
            .await?;

        Ok(count)
    }
}
