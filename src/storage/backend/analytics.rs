use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use super::SeaOrmStore;
use super::converters::{model_to_stored_event, model_to_visit_record};
use crate::analytics::AnalyticsSource;
use crate::tracking::{StoredEvent, VisitRecord};

use migration::entities::{interaction_event, visitor_analytics};

#[async_trait]
impl AnalyticsSource for SeaOrmStore {
    async fn visits_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<VisitRecord>> {
        let models = visitor_analytics::Entity::find()
            .filter(visitor_analytics::Column::CreatedAt.gte(since))
            .order_by_asc(visitor_analytics::Column::CreatedAt)
            .order_by_asc(visitor_analytics::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to query visits: {}", e))?;

        debug!("Fetched {} visits since {}", models.len(), since);
        Ok(models.into_iter().map(model_to_visit_record).collect())
    }

    async fn recent_events_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<StoredEvent>> {
        let models = interaction_event::Entity::find()
            .filter(interaction_event::Column::CreatedAt.gte(since))
            .order_by_desc(interaction_event::Column::CreatedAt)
            .order_by_desc(interaction_event::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to query interaction events: {}", e))?;

        debug!("Fetched {} events since {}", models.len(), since);
        Ok(models.into_iter().map(model_to_stored_event).collect())
    }
}
