use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::trace;

use super::SeaOrmStore;
use super::converters::visit_to_active_model;
use crate::errors::SitepulseError;
use crate::tracking::{NewVisit, VisitHandle, VisitStore, VisitUpdate};

use migration::entities::visitor_analytics;

#[async_trait]
impl VisitStore for SeaOrmStore {
    async fn insert_visit(&self, visit: NewVisit) -> anyhow::Result<VisitHandle> {
        let model = visit_to_active_model(visit, Utc::now());
        let result = visitor_analytics::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert visit: {}", e))?;

        trace!("Visit {} inserted", result.last_insert_id);
        Ok(VisitHandle::new(result.last_insert_id))
    }

    async fn update_visit(&self, handle: VisitHandle, update: VisitUpdate) -> anyhow::Result<()> {
        let result = visitor_analytics::Entity::update_many()
            .col_expr(
                visitor_analytics::Column::ScrollDepth,
                Expr::value(i32::from(update.scroll_depth)),
            )
            .col_expr(
                visitor_analytics::Column::TimeOnPage,
                Expr::value(i32::try_from(update.time_on_page).unwrap_or(i32::MAX)),
            )
            .col_expr(
                visitor_analytics::Column::Clicks,
                Expr::value(i32::try_from(update.clicks).unwrap_or(i32::MAX)),
            )
            .col_expr(visitor_analytics::Column::PatchedAt, Expr::value(Utc::now()))
            .filter(visitor_analytics::Column::Id.eq(handle.id()))
            .filter(visitor_analytics::Column::PatchedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update visit {}: {}", handle.id(), e))?;

        if result.rows_affected == 0 {
            let exists = visitor_analytics::Entity::find_by_id(handle.id())
                .one(&self.db)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to look up visit {}: {}", handle.id(), e))?
                .is_some();
            let err = if exists {
                SitepulseError::conflict(format!("Visit {} was already updated", handle.id()))
            } else {
                SitepulseError::not_found(format!("Visit {} not found", handle.id()))
            };
            return Err(err.into());
        }

        trace!("Visit {} updated", handle.id());
        Ok(())
    }
}
