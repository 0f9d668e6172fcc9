//! ClickSink implementation for UrlStore
//!
//! Both steps are best-effort and independent: a failed counter increment
//! does not block the event insert, and neither failure ever reaches the
//! redirect path.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter};
use tracing::warn;

use super::UrlStore;
use super::retry;
use crate::analytics::{ClickEvent, ClickSink};

use migration::entities::{click, short_url};

#[async_trait]
impl ClickSink for UrlStore {
    async fn record_click(&self, event: ClickEvent) -> anyhow::Result<()> {
        let db = self.db();

        // Atomic increment at the datastore level; a read-then-write here
        // would drop counts under concurrent redirects of the same slug.
        let increment = retry::with_retry("increment_click_count", self.retry_config(), || async {
            short_url::Entity::update_many()
                .col_expr(
                    short_url::Column::ClickCount,
                    Expr::col(short_url::Column::ClickCount).add(1),
                )
                .filter(short_url::Column::Id.eq(&event.url_id))
                .exec(db)
                .await
        })
        .await;

        if let Err(e) = increment {
            warn!(
                "Failed to increment click_count for url {}: {}",
                event.url_id, e
            );
        }

        let model = click::ActiveModel {
            url_id: Set(event.url_id.clone()),
            created_at: Set(event.timestamp),
            ip_hash: Set(event.ip_hash.clone()),
            user_agent: Set(event.user_agent.clone()),
            referrer: Set(event.referrer.clone()),
            country: Set(event.country.clone()),
            city: Set(event.city.clone()),
            device: Set(event.device.clone()),
            browser: Set(event.browser.clone()),
            os: Set(event.os.clone()),
            ..Default::default()
        };

        retry::with_retry("insert_click", self.retry_config(), || async {
            click::Entity::insert(model.clone()).exec(db).await
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to insert click row: {}", e))?;

        Ok(())
    }
}
